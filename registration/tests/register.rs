use std::sync::Arc;

use wicket_challenge::ChallengeError;
use wicket_crypto::{HashParams, PasswordHasher};
use wicket_nullables::{NullAccountStore, NullChallengeVerifier, NullStoreFault};
use wicket_registration::{RegistrationError, RegistrationRequest, RegistrationService};
use wicket_store::AccountStore;
use wicket_store_lmdb::{LmdbEnvironment, Migrator};
use wicket_types::{Role, UniqueField, ValidationError};

fn cheap_hasher() -> PasswordHasher {
    PasswordHasher::new(HashParams {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    })
}

struct Harness {
    store: Arc<NullAccountStore>,
    verifier: Arc<NullChallengeVerifier>,
    service: RegistrationService,
}

fn harness_with(verifier: NullChallengeVerifier, store: NullAccountStore) -> Harness {
    let store = Arc::new(store);
    let verifier = Arc::new(verifier);
    let service = RegistrationService::new(store.clone(), verifier.clone(), cheap_hasher());
    Harness {
        store,
        verifier,
        service,
    }
}

fn harness() -> Harness {
    harness_with(
        NullChallengeVerifier::accepting(&["ok", "ok2"]),
        NullAccountStore::new(),
    )
}

fn request(phone: &str, parent: &str, token: &str) -> RegistrationRequest {
    RegistrationRequest {
        full_name: Some("Asha Rai".into()),
        phone_number: Some(phone.into()),
        parent_phone_number: Some(parent.into()),
        password: Some("correct horse".into()),
        confirm_password: Some("correct horse".into()),
        challenge_token: Some(token.into()),
    }
}

#[tokio::test]
async fn happy_path_creates_user_with_hashed_password() {
    let h = harness();
    let account = h.service.register(&request("100", "200", "ok")).await.unwrap();

    assert_eq!(account.role, Role::User);
    assert_eq!(account.phone_number.as_str(), "100");
    assert_ne!(account.password_hash.as_str(), "correct horse");
    assert!(cheap_hasher()
        .verify("correct horse", &account.password_hash)
        .unwrap());

    let stored = h.store.accounts();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0], account);
    assert_eq!(h.verifier.seen_tokens(), vec!["ok"]);
}

#[tokio::test]
async fn second_registration_with_same_phone_conflicts() {
    let h = harness();
    h.service.register(&request("100", "200", "ok")).await.unwrap();

    let err = h
        .service
        .register(&request("100", "300", "ok2"))
        .await
        .unwrap_err();
    assert!(matches!(err, RegistrationError::Conflict(UniqueField::PhoneNumber)));
    assert_eq!(h.store.accounts().len(), 1);
    // The challenge was re-verified even though the record conflicted.
    assert_eq!(h.verifier.call_count(), 2);
}

#[tokio::test]
async fn second_registration_with_same_parent_conflicts() {
    let h = harness();
    h.service.register(&request("100", "200", "ok")).await.unwrap();

    let err = h
        .service
        .register(&request("101", "200", "ok"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RegistrationError::Conflict(UniqueField::ParentPhoneNumber)
    ));
}

#[tokio::test]
async fn cross_field_reuse_is_allowed() {
    let h = harness();
    h.service.register(&request("100", "200", "ok")).await.unwrap();
    // New phone equals an existing parent phone; uniqueness is per field.
    h.service.register(&request("200", "300", "ok")).await.unwrap();
    assert_eq!(h.store.accounts().len(), 2);
}

#[tokio::test]
async fn password_mismatch_is_rejected_without_write() {
    let h = harness();
    let mut req = request("100", "200", "ok");
    req.confirm_password = Some("different".into());

    let err = h.service.register(&req).await.unwrap_err();
    assert!(matches!(
        err,
        RegistrationError::Validation(ValidationError::PasswordMismatch)
    ));
    assert_eq!(h.store.insert_attempts(), 0);
}

#[tokio::test]
async fn phone_equal_to_parent_is_rejected() {
    let h = harness();
    let err = h
        .service
        .register(&request("100", "100", "ok"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RegistrationError::Validation(ValidationError::PhoneEqualsParent)
    ));
    assert!(h.store.accounts().is_empty());
}

#[tokio::test]
async fn missing_field_wins_over_everything_else() {
    let h = harness();
    let mut req = request("100", "100", "");
    req.full_name = None;
    req.confirm_password = Some("different".into());

    let err = h.service.register(&req).await.unwrap_err();
    assert!(matches!(
        err,
        RegistrationError::Validation(ValidationError::MissingFields)
    ));
    assert_eq!(h.verifier.call_count(), 0);
}

#[tokio::test]
async fn missing_token_is_reported_after_fields() {
    let h = harness();
    let mut req = request("100", "200", "");
    req.challenge_token = None;

    let err = h.service.register(&req).await.unwrap_err();
    assert!(matches!(
        err,
        RegistrationError::Validation(ValidationError::ChallengeRequired)
    ));
    assert_eq!(h.verifier.call_count(), 0);
}

#[tokio::test]
async fn rejected_token_wins_over_password_mismatch() {
    let h = harness();
    let mut req = request("100", "200", "bad");
    req.confirm_password = Some("different".into());

    let err = h.service.register(&req).await.unwrap_err();
    assert!(matches!(
        err,
        RegistrationError::Challenge(ChallengeError::Rejected { .. })
    ));
    assert!(h.store.accounts().is_empty());
}

#[tokio::test]
async fn unconfigured_secret_is_a_configuration_error() {
    let h = harness_with(NullChallengeVerifier::unconfigured(), NullAccountStore::new());
    let err = h
        .service
        .register(&request("100", "200", "ok"))
        .await
        .unwrap_err();
    assert!(matches!(err, RegistrationError::Configuration(_)));
    assert_eq!(h.verifier.call_count(), 0);
    assert_eq!(h.store.insert_attempts(), 0);
}

#[tokio::test]
async fn unreachable_challenge_service_rejects() {
    let h = harness_with(NullChallengeVerifier::unreachable(), NullAccountStore::new());
    let err = h
        .service
        .register(&request("100", "200", "ok"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RegistrationError::Challenge(ChallengeError::Transport(_))
    ));
    assert!(h.store.accounts().is_empty());
}

#[tokio::test]
async fn race_past_precheck_still_conflicts() {
    let h = harness();
    h.service.register(&request("100", "200", "ok")).await.unwrap();
    h.store.set_stale_reads(true);

    let err = h
        .service
        .register(&request("100", "300", "ok"))
        .await
        .unwrap_err();
    assert!(matches!(err, RegistrationError::Conflict(UniqueField::PhoneNumber)));
    assert_eq!(h.store.insert_attempts(), 2);
    assert_eq!(h.store.accounts().len(), 1);
}

#[tokio::test]
async fn concurrent_duplicates_yield_one_account() {
    let h = harness();
    let mut tasks = Vec::new();
    for i in 0..8 {
        let service = h.service.clone();
        tasks.push(tokio::spawn(async move {
            service
                .register(&request("100", &format!("20{i}"), "ok"))
                .await
        }));
    }

    let mut created = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => created += 1,
            Err(RegistrationError::Conflict(UniqueField::PhoneNumber)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(h.store.accounts().len(), 1);
}

#[tokio::test]
async fn uninitialized_schema_is_persistence_unavailable() {
    let h = harness_with(
        NullChallengeVerifier::accepting(&["ok"]),
        NullAccountStore::with_fault(NullStoreFault::SchemaMissing),
    );
    let err = h
        .service
        .register(&request("100", "200", "ok"))
        .await
        .unwrap_err();
    assert!(matches!(err, RegistrationError::PersistenceUnavailable(_)));
}

#[tokio::test]
async fn unclassified_backend_failure_is_internal() {
    let h = harness_with(
        NullChallengeVerifier::accepting(&["ok"]),
        NullAccountStore::with_fault(NullStoreFault::Backend),
    );
    let err = h
        .service
        .register(&request("100", "200", "ok"))
        .await
        .unwrap_err();
    assert!(matches!(err, RegistrationError::Internal(_)));
}

#[tokio::test]
async fn long_phone_numbers_register_against_lmdb() {
    let dir = tempfile::tempdir().unwrap();
    let env = LmdbEnvironment::open(dir.path(), 16 * 1024 * 1024).unwrap();
    Migrator::run(&env).unwrap();
    let store = Arc::new(env.account_store());
    let service = RegistrationService::new(
        store.clone(),
        Arc::new(NullChallengeVerifier::accepting(&["ok"])),
        cheap_hasher(),
    );

    let phone = "9".repeat(600);
    let parent = "8".repeat(600);
    let account = service
        .register(&request(&phone, &parent, "ok"))
        .await
        .unwrap();
    assert_eq!(account.phone_number.as_str(), phone);

    let err = service
        .register(&request(&phone, "300", "ok"))
        .await
        .unwrap_err();
    assert!(matches!(err, RegistrationError::Conflict(UniqueField::PhoneNumber)));
    let err = service
        .register(&request("301", &parent, "ok"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RegistrationError::Conflict(UniqueField::ParentPhoneNumber)
    ));
    assert_eq!(store.account_count().unwrap(), 1);
}
