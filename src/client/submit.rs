//! Task submission workflow: resolve, de-duplicate, filter, create.

use crate::error::{Result, TorrentError};
use crate::filter::FileFilter;
use crate::torrent::Metainfo;
use crate::types::{SubmitOptions, SubmitOutcome, TaskFile};
use reqwest::Method;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::Path;

use super::directory::validate_sub_dir;
use super::resources::flatten;
use super::tasks::TASK_TYPE_URL;
use super::XunleiClient;

/// Files chosen for download and the aggregates sent upstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FileSelection {
    /// Selected files in discovery order
    pub(crate) files: Vec<TaskFile>,
    /// Sum of the selected files' sizes
    pub(crate) total_size: u64,
    /// Comma-joined indices of the selected files
    pub(crate) indices: String,
}

/// Apply the filter and compute the size / index aggregates
///
/// Selected files are put back into discovery order. Files the filter
/// invented (indices never discovered) are dropped so the submitted indices
/// stay a subset of what the panel reported.
pub(crate) fn select_files(
    discovered: Vec<TaskFile>,
    filter: Option<&dyn FileFilter>,
) -> FileSelection {
    let mut position: HashMap<u64, usize> = HashMap::new();
    for (pos, file) in discovered.iter().enumerate() {
        position.entry(file.index).or_insert(pos);
    }

    let chosen = match filter {
        Some(filter) => filter.filter(discovered),
        None => discovered,
    };

    let mut ordered: Vec<(usize, TaskFile)> = chosen
        .into_iter()
        .filter_map(|file| match position.get(&file.index) {
            Some(&pos) => Some((pos, file)),
            None => {
                tracing::warn!(
                    index = file.index,
                    file_name = %file.file_name,
                    "filter returned a file that was not discovered; ignoring it"
                );
                None
            }
        })
        .collect();
    ordered.sort_by_key(|(pos, _)| *pos);

    let files: Vec<TaskFile> = ordered.into_iter().map(|(_, file)| file).collect();
    let total_size = files.iter().map(|f| f.file_size).sum();
    let indices = files
        .iter()
        .map(|f| f.index.to_string())
        .collect::<Vec<_>>()
        .join(",");

    FileSelection {
        files,
        total_size,
        indices,
    }
}

impl XunleiClient {
    /// Submit a magnet link as a download task
    ///
    /// 1. Resolve the link's resource tree (no resources: `Failed`)
    /// 2. Skip with `AlreadyExists` if a completed or uncompleted task has the
    ///    same name; nothing is created in that case
    /// 3. Flatten the tree and apply `options.filter`; an empty selection is
    ///    still submitted, with size `"0"` and no indices
    /// 4. Create `options.sub_dir` under the root folder if given
    /// 5. Create the task; upstream `HttpStatus == 0` means `Created`
    ///
    /// A sub-directory containing a path separator fails before any request
    /// is made. Errors are logged and reported as `Failed`, never raised.
    ///
    /// The duplicate check and the creation are separate calls: two clients
    /// submitting the same link at the same time can both pass the check and
    /// create two tasks with the same name. The panel offers no way to close
    /// that window.
    pub async fn submit_magnet(&mut self, magnet: &str, options: &SubmitOptions) -> SubmitOutcome {
        match self.try_submit_magnet(magnet, options).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(magnet = %magnet, error = %e, "magnet submission failed");
                SubmitOutcome::Failed
            }
        }
    }

    async fn try_submit_magnet(
        &mut self,
        magnet: &str,
        options: &SubmitOptions,
    ) -> Result<SubmitOutcome> {
        tracing::info!(magnet = %magnet, ?options, "submitting magnet");

        let sub_dir = options.sub_dir();
        if let Some(dir) = sub_dir {
            validate_sub_dir(dir)?;
        }
        let root_folder_id = self.root_folder_id()?;

        let Some(resolved) = self.resolve(magnet).await? else {
            return Ok(SubmitOutcome::Failed);
        };
        let task_name = resolved.task_name;

        let existing = self.existing_task_names().await?;
        if existing.contains(&task_name) {
            tracing::info!(task_name = %task_name, "task already exists, skipping");
            return Ok(SubmitOutcome::AlreadyExists);
        }

        let discovered = flatten(&resolved.resources)?;
        let discovered_count = discovered.len();
        let selection = select_files(discovered, options.filter.as_deref());
        if selection.files.is_empty() {
            tracing::warn!(
                task_name = %task_name,
                discovered = discovered_count,
                "no files left after filtering, submitting an empty selection"
            );
        }
        tracing::info!(
            task_name = %task_name,
            selected = selection.files.len(),
            discovered = discovered_count,
            total_size = selection.total_size,
            "selected files"
        );

        let parent_folder_id = match sub_dir {
            Some(dir) => self.create_subfolder(dir).await?,
            None => root_folder_id,
        };
        let device_id = self.device_id().await?;

        let body = json!({
            "type": TASK_TYPE_URL,
            "name": task_name,
            "file_name": task_name,
            "file_size": selection.total_size.to_string(),
            "space": device_id,
            "params": {
                "target": device_id,
                "url": magnet,
                "total_file_count": resolved.file_count.to_string(),
                "parent_folder_id": parent_folder_id,
                "sub_file_index": selection.indices,
                "file_id": "",
            },
        });

        tracing::info!(task_name = %task_name, parent_folder_id = %parent_folder_id, "creating task");
        let result = self
            .request(
                Method::POST,
                "/drive/v1/task",
                &[("device_space", "")],
                Some(&body),
            )
            .await?;

        if result.get("HttpStatus").and_then(Value::as_i64) == Some(0) {
            tracing::info!(task_name = %task_name, "task created");
            Ok(SubmitOutcome::Created)
        } else {
            tracing::error!(task_name = %task_name, response = %result, "task creation rejected");
            Ok(SubmitOutcome::Failed)
        }
    }

    /// Submit a local `.torrent` file
    ///
    /// The torrent is converted to a magnet link carrying all of its trackers
    /// and handed to [`submit_magnet`](Self::submit_magnet). An unreadable or
    /// invalid torrent yields `Failed`.
    pub async fn submit_torrent_file(
        &mut self,
        path: impl AsRef<Path>,
        options: &SubmitOptions,
    ) -> SubmitOutcome {
        let path = path.as_ref();
        let converted = match tokio::fs::read(path).await {
            Ok(data) => Metainfo::from_bytes(&data).map(|meta| meta.magnet_with_trackers()),
            Err(source) => Err(TorrentError::Read {
                path: path.to_path_buf(),
                source,
            }),
        };
        let magnet = match converted {
            Ok(magnet) => magnet,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "failed to convert torrent");
                return SubmitOutcome::Failed;
            }
        };
        tracing::debug!(path = %path.display(), magnet = %magnet, "converted torrent to magnet");
        self.submit_magnet(&magnet, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::SizeRangeFilter;

    fn file(index: u64, size: u64) -> TaskFile {
        TaskFile {
            index,
            file_name: format!("f{index}"),
            file_size: size,
        }
    }

    #[test]
    fn without_filter_everything_is_selected() {
        let selection = select_files(vec![file(0, 10), file(1, 20), file(2, 30)], None);
        assert_eq!(selection.total_size, 60);
        assert_eq!(selection.indices, "0,1,2");
    }

    #[test]
    fn total_size_counts_only_filtered_files() {
        let filter = SizeRangeFilter::new(15, 100);
        let selection = select_files(
            vec![file(0, 10), file(1, 20), file(2, 30)],
            Some(&filter),
        );
        assert_eq!(selection.total_size, 50);
        assert_eq!(selection.indices, "1,2");
    }

    #[test]
    fn reordering_filter_is_put_back_into_discovery_order() {
        let reverse = |mut files: Vec<TaskFile>| {
            files.reverse();
            files
        };
        let selection = select_files(vec![file(4, 1), file(2, 1), file(9, 1)], Some(&reverse));
        assert_eq!(selection.indices, "4,2,9");
    }

    #[test]
    fn invented_files_are_dropped() {
        let invent = |mut files: Vec<TaskFile>| {
            files.push(file(99, 1_000));
            files
        };
        let selection = select_files(vec![file(0, 5)], Some(&invent));
        assert_eq!(selection.indices, "0");
        assert_eq!(selection.total_size, 5);
    }

    #[test]
    fn colliding_default_indices_are_kept() {
        let selection = select_files(vec![file(0, 1), file(0, 2)], None);
        assert_eq!(selection.indices, "0,0");
        assert_eq!(selection.total_size, 3);
    }
}
