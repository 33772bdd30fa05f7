// Resume uploads: multipart in, S3 object out, presigned GET URL back.
// The returned URL is what the extract and screening endpoints consume as file_url.

pub mod handlers;

use uuid::Uuid;

use crate::extract::classify::extension_from_name;

/// Object key for an uploaded resume: `resumes/{user_id}/{uuid}.{ext}`.
/// Non-alphanumeric extension characters are dropped; no extension yields `bin`.
pub fn object_key_for(user_id: Uuid, file_name: &str) -> String {
    let ext: String = extension_from_name(file_name)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    let ext = if ext.is_empty() { "bin".to_string() } else { ext };
    format!("resumes/{user_id}/{}.{ext}", Uuid::new_v4())
}
