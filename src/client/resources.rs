//! Magnet resource lookup and resource tree flattening.

use crate::error::{Error, Result};
use crate::types::{ResolvedResource, Resource, TaskFile};
use crate::utils::{de_opt_u64, de_string, de_u64};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use super::XunleiClient;

/// Deepest directory nesting accepted in a resource tree
pub const MAX_RESOURCE_DEPTH: usize = 64;

#[derive(Debug, Deserialize)]
struct ResourceListResponse {
    #[serde(default)]
    list: Option<RawResourceList>,
}

#[derive(Debug, Deserialize)]
struct RawResourceList {
    #[serde(default)]
    resources: Option<Vec<RawResource>>,
}

#[derive(Debug, Deserialize)]
struct RawResource {
    #[serde(default, deserialize_with = "de_string")]
    name: String,
    #[serde(default, deserialize_with = "de_u64")]
    file_size: u64,
    #[serde(default, deserialize_with = "de_opt_u64")]
    file_index: Option<u64>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    file_count: Option<u64>,
    #[serde(default)]
    is_dir: bool,
    #[serde(default)]
    dir: Option<RawResourceList>,
}

impl RawResource {
    fn into_resource(self) -> Resource {
        if self.is_dir {
            let children = self
                .dir
                .and_then(|d| d.resources)
                .unwrap_or_default()
                .into_iter()
                .map(RawResource::into_resource)
                .collect();
            Resource::Directory {
                name: self.name,
                children,
            }
        } else {
            Resource::File {
                index: self.file_index,
                name: self.name,
                size: self.file_size,
            }
        }
    }
}

/// Flatten a resource tree into its files, depth-first in upstream order
///
/// Files without a declared index get index 0.
///
/// # Errors
///
/// [`Error::MalformedResponse`] when directories nest deeper than
/// [`MAX_RESOURCE_DEPTH`].
///
/// # Examples
///
/// ```
/// use xunlei_client::{Resource, flatten};
///
/// let tree = vec![Resource::Directory {
///     name: "Show".into(),
///     children: vec![
///         Resource::File { index: Some(0), name: "e01.mkv".into(), size: 10 },
///         Resource::File { index: Some(1), name: "e02.mkv".into(), size: 20 },
///     ],
/// }];
/// let files = flatten(&tree).unwrap();
/// assert_eq!(files.len(), 2);
/// assert_eq!(files[1].file_name, "e02.mkv");
/// ```
pub fn flatten(resources: &[Resource]) -> Result<Vec<TaskFile>> {
    let mut files = Vec::new();
    flatten_into(resources, 0, &mut files)?;
    Ok(files)
}

fn flatten_into(resources: &[Resource], depth: usize, out: &mut Vec<TaskFile>) -> Result<()> {
    if depth > MAX_RESOURCE_DEPTH {
        return Err(Error::MalformedResponse(format!(
            "resource tree deeper than {} levels",
            MAX_RESOURCE_DEPTH
        )));
    }
    for resource in resources {
        match resource {
            Resource::Directory { children, .. } => flatten_into(children, depth + 1, out)?,
            Resource::File { index, name, size } => out.push(TaskFile {
                index: index.unwrap_or(0),
                file_name: name.clone(),
                file_size: *size,
            }),
        }
    }
    Ok(())
}

impl XunleiClient {
    /// Look up what a magnet link contains
    ///
    /// Returns `Ok(None)` when the panel reports no resources for the link.
    pub async fn resolve(&mut self, magnet: &str) -> Result<Option<ResolvedResource>> {
        tracing::info!(magnet = %magnet, "resolving magnet resources");
        let body = json!({ "urls": magnet });
        let timeout = self.config.resource_timeout;
        let data = self
            .request_with_timeout(
                Method::POST,
                "/drive/v1/resource/list",
                &[("device_space", "")],
                Some(&body),
                timeout,
            )
            .await?;

        let response: ResourceListResponse = serde_json::from_value(data)?;
        let raw = response
            .list
            .and_then(|l| l.resources)
            .unwrap_or_default();
        if raw.is_empty() {
            tracing::warn!(magnet = %magnet, "no resources found for magnet");
            return Ok(None);
        }

        let task_name = raw[0].name.clone();
        let declared_count = raw[0].file_count;
        let resources: Vec<Resource> = raw.into_iter().map(RawResource::into_resource).collect();
        let file_count = match declared_count {
            Some(count) => count,
            None => flatten(&resources)?.len() as u64,
        };

        tracing::info!(task_name = %task_name, file_count, "resolved magnet resources");
        Ok(Some(ResolvedResource {
            task_name,
            file_count,
            resources,
        }))
    }
}
