use std::env;

use anyhow::anyhow;
use isahc::{ReadResponseExt, Request, RequestExt};

use crate::schema::remote::{IncidentRow, PasswordGrant, ProfileRow, TokenGrant};
use crate::schema::session::{User, UserRole};

const EVIDENCE_BUCKET: &str = "incident-evidence";

fn remote_config() -> Result<(String, String), anyhow::Error> {
    let base = env::var("PROMETEO_REMOTE_URL")?;
    let key = env::var("PROMETEO_REMOTE_KEY")?;
    Ok((base, key))
}

/// Inserts one row into the fixed `incidents` table.
pub fn insert_incident(row: &IncidentRow) -> Result<(), anyhow::Error> {
    let (base, key) = remote_config()?;
    let response = Request::post(format!("{base}/rest/v1/incidents"))
        .header("apikey", key.as_str())
        .header("Authorization", format!("Bearer {key}"))
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(&[row])?)?
        .send()?;

    if response.status().is_success() {
        Ok(())
    } else {
        Err(anyhow!("Failed to insert incident row."))
    }
}

/// Uploads an evidence image into the fixed bucket and returns its public
/// URL. A failed follow-up insert is not reconciled; the upload stays.
pub fn upload_evidence(name: &str, bytes: Vec<u8>) -> Result<String, anyhow::Error> {
    let (base, key) = remote_config()?;
    let response = Request::post(format!("{base}/storage/v1/object/{EVIDENCE_BUCKET}/{name}"))
        .header("apikey", key.as_str())
        .header("Authorization", format!("Bearer {key}"))
        .header("Content-Type", "application/octet-stream")
        .body(bytes)?
        .send()?;

    if response.status().is_success() {
        Ok(format!(
            "{base}/storage/v1/object/public/{EVIDENCE_BUCKET}/{name}"
        ))
    } else {
        Err(anyhow!("Failed to upload evidence."))
    }
}

/// Password-grant credential exchange plus a `profiles` row lookup for the
/// role. `Ok(None)` means the credentials were rejected, which is an
/// expected outcome rather than a fault.
pub fn exchange_credentials(
    email: &str,
    password: &str,
) -> Result<Option<User>, anyhow::Error> {
    let (base, key) = remote_config()?;
    let mut response = Request::post(format!("{base}/auth/v1/token?grant_type=password"))
        .header("apikey", key.as_str())
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(&PasswordGrant {
            email: email.to_string(),
            password: password.to_string(),
        })?)?
        .send()?;

    if response.status().as_u16() == 400 || response.status().as_u16() == 401 {
        return Ok(None);
    }
    if !response.status().is_success() {
        return Err(anyhow!("Credential exchange failed."));
    }
    let grant: TokenGrant = response.json()?;

    let mut response = Request::get(format!(
        "{base}/rest/v1/profiles?id=eq.{}&select=*",
        grant.user.id
    ))
    .header("apikey", key.as_str())
    .header("Authorization", format!("Bearer {}", grant.access_token))
    .body(())?
    .send()?;

    if !response.status().is_success() {
        return Err(anyhow!("Profile lookup failed."));
    }
    let profiles: Vec<ProfileRow> = response.json()?;
    let profile = profiles.into_iter().next();

    let role = match profile.as_ref().and_then(|p| p.role.as_deref()) {
        Some("Responder") => UserRole::Responder,
        _ => UserRole::Citizen,
    };
    Ok(Some(User {
        id: grant.user.id,
        name: profile
            .as_ref()
            .and_then(|p| p.name.clone())
            .unwrap_or_else(|| grant.user.email.clone()),
        email: grant.user.email,
        role,
        avatar: profile.and_then(|p| p.avatar),
    }))
}
