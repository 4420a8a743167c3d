//! End-to-end: authority issues, client signs, service authenticates.

use std::sync::{Arc, Once};

use chrono::{DateTime, Duration, Utc};
use http::Request;
use tessera_auth::cert::encode_base64;
use tessera_auth::identity::PrivateKey;
use tessera_auth::request::{sign_request, CERTIFICATE_HEADER, DATE_HEADER};
use tessera_authority::{Authority, Credentials, MemoryStore, RoleId, SignInOptions, UserPayload};
use tessera_service::{AnonymousReason, AuthFilter, ServiceConfig, ServiceIssuer};

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default()
}

fn signed_request(
    certificate: &[u8],
    device: &PrivateKey,
    body: &'static [u8],
) -> anyhow::Result<Request<&'static [u8]>> {
    let mut request = Request::builder()
        .method("POST")
        .uri("/v1/notes")
        .header(CERTIFICATE_HEADER, encode_base64(certificate))
        .header(DATE_HEADER, "Tue, 14 Nov 2023 22:13:20 GMT")
        .body(body)?;
    sign_request(&mut request, device)?;
    Ok(request)
}

struct World {
    authority: Authority<MemoryStore, MemoryStore>,
    store: MemoryStore,
    filter: AuthFilter<UserPayload>,
}

impl World {
    fn new() -> anyhow::Result<Self> {
        init_tracing();
        let store = MemoryStore::new();
        let authority = Authority::new(
            store.clone(),
            store.clone(),
            Arc::new(PrivateKey::generate()),
        );

        // The service learns the authority key from its config file
        let config = ServiceConfig::from_toml_str(&format!(
            "trusted_issuers = [\"{}\"]\n",
            authority.public_key().to_base64()
        ))?;
        let filter = AuthFilter::from_config(&config)?;
        Ok(Self {
            authority,
            store,
            filter,
        })
    }
}

#[test]
fn test_signed_in_client_is_authenticated() -> anyhow::Result<()> {
    let world = World::new()?;
    let device = PrivateKey::generate();
    world
        .authority
        .sign_up(&Credentials::new("ada", "pw"), device.public_key(), epoch())?;
    world.store.set_roles("ada", vec![RoleId(0), RoleId(3)]);
    let issued = world.authority.sign_in(
        &Credentials::new("ada", "pw"),
        device.public_key(),
        SignInOptions::transient(),
        epoch(),
    )?;

    let request = signed_request(&issued.bytes, &device, b"{\"text\":\"hello\"}")?;
    let outcome = world.filter.authenticate(&request, epoch() + Duration::minutes(1));

    let context = outcome
        .context()
        .ok_or_else(|| anyhow::anyhow!("expected authenticated, got {outcome:?}"))?;
    assert_eq!(context.payload().username, "ada");
    let roles: Vec<u8> = context.roles::<RoleId>()?.into_iter().map(|r| r.0).collect();
    assert_eq!(roles, vec![0, 3]);
    Ok(())
}

#[test]
fn test_stolen_certificate_without_device_key() -> anyhow::Result<()> {
    let world = World::new()?;
    let device = PrivateKey::generate();
    let issued = world
        .authority
        .sign_up(&Credentials::new("ada", "pw"), device.public_key(), epoch())?;

    let thief = PrivateKey::generate();
    let request = signed_request(&issued.bytes, &thief, b"")?;
    assert_eq!(
        world.filter.authenticate(&request, epoch()).anonymous_reason(),
        Some(AnonymousReason::SignatureValidationFailed)
    );
    Ok(())
}

#[test]
fn test_certificate_from_unknown_authority() -> anyhow::Result<()> {
    let world = World::new()?;
    let store = MemoryStore::new();
    let rogue = Authority::new(store.clone(), store, Arc::new(PrivateKey::generate()));
    let device = PrivateKey::generate();
    let issued = rogue.sign_up(&Credentials::new("mallory", "pw"), device.public_key(), epoch())?;

    let request = signed_request(&issued.bytes, &device, b"")?;
    assert_eq!(
        world.filter.authenticate(&request, epoch()).anonymous_reason(),
        Some(AnonymousReason::InvalidCertificate)
    );
    Ok(())
}

#[test]
fn test_refreshed_certificate_authenticates_after_old_expiry() -> anyhow::Result<()> {
    let world = World::new()?;
    let device = PrivateKey::generate();
    world
        .authority
        .sign_up(&Credentials::new("ada", "pw"), device.public_key(), epoch())?;
    let issued = world.authority.sign_in(
        &Credentials::new("ada", "pw"),
        device.public_key(),
        SignInOptions::transient(),
        epoch(),
    )?;

    let renewed = world
        .authority
        .refresh(&issued.bytes, epoch() + Duration::minutes(10))?;
    let after_old_expiry = epoch() + Duration::minutes(20);

    let stale = signed_request(&issued.bytes, &device, b"")?;
    assert_eq!(
        world.filter.authenticate(&stale, after_old_expiry).anonymous_reason(),
        Some(AnonymousReason::InvalidCertificate)
    );

    let fresh = signed_request(&renewed.bytes, &device, b"")?;
    assert!(world
        .filter
        .authenticate(&fresh, after_old_expiry)
        .is_authenticated());
    Ok(())
}

#[test]
fn test_inter_service_certificate() -> anyhow::Result<()> {
    init_tracing();
    let caller_key = Arc::new(PrivateKey::generate());
    let issuer = ServiceIssuer::new(caller_key.clone());
    let callee_config = ServiceConfig::from_toml_str(&format!(
        "trusted_issuers = [\"{}\"]\n",
        issuer.public_key().to_base64()
    ))?;
    let filter: AuthFilter<String> = AuthFilter::from_config(&callee_config)?;

    // The calling service certifies its own key
    let bytes = issuer.issue(
        caller_key.public_key(),
        &[RoleId(7)],
        "billing".to_string(),
        epoch(),
    )?;
    let request = signed_request(&bytes, &caller_key, b"{}")?;

    let outcome = filter.authenticate(&request, epoch());
    let context = outcome
        .context()
        .ok_or_else(|| anyhow::anyhow!("expected authenticated, got {outcome:?}"))?;
    assert_eq!(context.payload(), "billing");

    let late = epoch() + issuer.validity() + Duration::seconds(1);
    assert_eq!(
        filter.authenticate(&request, late).anonymous_reason(),
        Some(AnonymousReason::InvalidCertificate)
    );
    Ok(())
}
