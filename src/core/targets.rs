use crate::domain::model::{DownloadTarget, RequestDate, ResourceKey};
use std::path::Path;

/// The four files published for every trading day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceFile {
    TickData,
    TickDataStructure,
    TradeCancellation,
    TradeCancellationStructure,
}

impl ResourceFile {
    pub const ALL: [ResourceFile; 4] = [
        ResourceFile::TickData,
        ResourceFile::TickDataStructure,
        ResourceFile::TradeCancellation,
        ResourceFile::TradeCancellationStructure,
    ];

    /// Name of the file under `<api_url>/<key>/`.
    pub fn remote_name(&self, date: &RequestDate) -> String {
        match self {
            ResourceFile::TickData => format!("WEBPXTICK_DT-{}.zip", date.compact()),
            ResourceFile::TickDataStructure => "TickData_structure.dat".to_string(),
            ResourceFile::TradeCancellation => "TC.txt".to_string(),
            ResourceFile::TradeCancellationStructure => "TC_structure.dat".to_string(),
        }
    }

    /// Name the file is saved under locally.
    pub fn local_name(&self, date: &RequestDate) -> String {
        match self {
            // TC.txt carries no date, so the local copy gets one
            ResourceFile::TradeCancellation => format!("TC_{}.txt", date.compact()),
            other => other.remote_name(date),
        }
    }
}

pub fn resource_url(api_url: &str, key: ResourceKey, remote_name: &str) -> String {
    format!("{}/{}/{}", api_url.trim_end_matches('/'), key, remote_name)
}

/// Builds the download targets for `date`, saved under `<folder_base>/<yyyy-mm-dd>/`.
pub fn build_targets(
    api_url: &str,
    key: ResourceKey,
    date: &RequestDate,
    folder_base: &Path,
) -> Vec<DownloadTarget> {
    let folder = folder_base.join(date.to_string());

    ResourceFile::ALL
        .iter()
        .map(|resource| {
            let file_name = resource.local_name(date);
            DownloadTarget {
                url: resource_url(api_url, key, &resource.remote_name(date)),
                destination_path: folder.join(&file_name),
                folder: folder.clone(),
                file_name,
            }
        })
        .collect()
}
