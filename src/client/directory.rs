//! Root download folder resolution and sub-folder creation.

use crate::error::{Error, Result};
use crate::types::Folder;
use crate::utils::de_string;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use super::XunleiClient;

/// Upstream kind marker for folders
pub(crate) const FOLDER_KIND: &str = "drive#folder";

/// Page size for folder listings
const FOLDER_PAGE_LIMIT: &str = "200";

#[derive(Debug, Default, Deserialize)]
struct FolderListResponse {
    #[serde(default)]
    files: Option<Vec<RawFolder>>,
}

#[derive(Debug, Deserialize)]
struct RawFolder {
    #[serde(default, deserialize_with = "de_string")]
    id: String,
    #[serde(default, deserialize_with = "de_string")]
    name: String,
}

/// Reject sub-directory names that are empty or span more than one level
pub(crate) fn validate_sub_dir(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('/') || name.contains('\\') {
        return Err(Error::InvalidSubDir(name.to_string()));
    }
    Ok(())
}

impl XunleiClient {
    /// Resolve and store the root download folder
    ///
    /// Lists the folders at the top of the device. With no name (or `""`) the
    /// first folder is used; otherwise the first folder whose name matches
    /// exactly, surrounding whitespace included. The result stays the root until `initialize` is
    /// called again.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] when the device has no folders at all
    /// - [`Error::NotFound`] when no folder has the requested name; carries
    ///   the available folder names
    pub async fn initialize(&mut self, root_dir_name: Option<&str>) -> Result<Folder> {
        let requested = root_dir_name.unwrap_or("");
        tracing::info!(requested = %requested, "initializing download directory");

        let folders = self.list_root_folders().await?;
        if folders.is_empty() {
            tracing::error!("no download folders found on device");
            return Err(Error::Config {
                message: "no download folders found on device".to_string(),
                key: Some("download_root_dir".to_string()),
            });
        }

        let names: Vec<String> = folders.iter().map(|f| f.name.clone()).collect();
        tracing::info!(count = folders.len(), folders = ?names, "found download folders");

        let chosen = if requested.is_empty() {
            folders.into_iter().next()
        } else {
            folders.into_iter().find(|f| f.name == requested)
        };

        let folder = match chosen {
            Some(folder) => folder,
            None => {
                let err = Error::NotFound {
                    requested: format!("download root dir '{}'", requested),
                    available: names,
                };
                tracing::error!(error = %err, "download root dir not found");
                return Err(err);
            }
        };

        if folder.id.is_empty() {
            return Err(Error::MalformedResponse(format!(
                "folder '{}' has no id",
                folder.name
            )));
        }

        tracing::info!(folder = %folder.name, folder_id = %folder.id, "using download folder");
        self.root_folder = Some(folder.clone());
        Ok(folder)
    }

    /// The root download folder, once resolved
    pub fn root_folder(&self) -> Option<&Folder> {
        self.root_folder.as_ref()
    }

    pub(crate) fn root_folder_id(&self) -> Result<String> {
        self.root_folder
            .as_ref()
            .map(|f| f.id.clone())
            .ok_or(Error::NotInitialized)
    }

    async fn list_root_folders(&mut self) -> Result<Vec<Folder>> {
        let device_id = self.device_id().await?;
        let filters = json!({ "kind": { "eq": FOLDER_KIND } }).to_string();
        let query = [
            ("space", device_id.as_str()),
            ("limit", FOLDER_PAGE_LIMIT),
            ("parent_id", ""),
            ("filters", filters.as_str()),
            ("page_token", ""),
            ("device_space", ""),
        ];

        let data = self
            .request(Method::GET, "/drive/v1/files", &query, None)
            .await?;
        let listing: FolderListResponse = serde_json::from_value(data)?;

        Ok(listing
            .files
            .unwrap_or_default()
            .into_iter()
            .map(|f| Folder {
                id: f.id,
                name: f.name,
            })
            .collect())
    }

    /// Create a single-level folder under the root download folder
    ///
    /// Returns the new folder's id. Names with a path separator are rejected
    /// before any request is made.
    pub async fn create_subfolder(&mut self, name: &str) -> Result<String> {
        validate_sub_dir(name).inspect_err(|_| {
            tracing::error!(name = %name, "multilevel sub-directories are not supported");
        })?;
        let parent_id = self.root_folder_id()?;
        let device_id = self.device_id().await?;

        let body = json!({
            "parent_id": parent_id,
            "name": name,
            "space": device_id,
            "kind": FOLDER_KIND,
        });
        let data = self
            .request(
                Method::POST,
                "/drive/v1/files",
                &[("device_space", "")],
                Some(&body),
            )
            .await?;

        let id = data
            .pointer("/file/id")
            .and_then(serde_json::Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                Error::MalformedResponse(format!("folder creation for '{}' returned no id", name))
            })?;

        tracing::info!(name = %name, folder_id = %id, "created sub-folder");
        Ok(id)
    }
}
