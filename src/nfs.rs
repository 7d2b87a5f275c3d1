use std::time::Duration;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use tokio::process;

/// One exported directory of an NFS server and the client groups allowed to
/// mount it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub dir: String,
    pub groups: Vec<String>,
}

#[tracing::instrument]
pub async fn exports(
    host: &str,
    timeout: Duration,
) -> anyhow::Result<Vec<Export>> {
    let listing = tokio::time::timeout(timeout, showmount(host))
        .await
        .with_context(|| {
            format!("showmount timed out after {timeout:?}: host={host:?}")
        })??;
    Ok(parse_exports(&listing))
}

async fn showmount(host: &str) -> anyhow::Result<String> {
    let out = process::Command::new("showmount")
        .args(["-e", "--no-headers", host])
        .output()
        .await?;
    if !out.status.success() {
        return Err(anyhow!(
            "showmount failed: host={host:?} status={:?} err={:?}",
            out.status,
            String::from_utf8_lossy(&out.stderr[..])
        ));
    }
    Ok(String::from_utf8(out.stdout)?)
}

/// Lines look like `/export/media 192.168.1.0/24,box2`. The group list may
/// also be whitespace-separated, or `(everyone)` when the server takes all
/// comers.
pub fn parse_exports(listing: &str) -> Vec<Export> {
    let mut exports = Vec::new();
    for line in listing.lines() {
        let mut fields = line.split_whitespace();
        let Some(dir) = fields.next() else {
            continue;
        };
        let groups: Vec<String> = fields
            .flat_map(|field| field.split(','))
            .filter(|group| !group.is_empty())
            .map(|group| group.to_string())
            .collect();
        exports.push(Export {
            dir: dir.to_string(),
            groups,
        });
    }
    exports
}

#[cfg(test)]
mod tests {
    use super::*;

    fn export(dir: &str, groups: &[&str]) -> Export {
        Export {
            dir: dir.to_string(),
            groups: groups.iter().map(|group| group.to_string()).collect(),
        }
    }

    #[test]
    fn parses_dirs_and_group_lists() {
        let listing = "\
            /export/media 192.168.1.0/24,box2\n\
            /export/backup (everyone)\n\
            \n\
            /srv/nfs *\n";
        assert_eq!(
            parse_exports(listing),
            vec![
                export("/export/media", &["192.168.1.0/24", "box2"]),
                export("/export/backup", &["(everyone)"]),
                export("/srv/nfs", &["*"]),
            ]
        );
    }

    #[test]
    fn parses_whitespace_separated_groups() {
        let listing = "/export box1 box2\n";
        assert_eq!(
            parse_exports(listing),
            vec![export("/export", &["box1", "box2"])]
        );
    }

    #[test]
    fn empty_listing_yields_no_exports() {
        assert_eq!(parse_exports(""), Vec::new());
        assert_eq!(parse_exports("\n\n"), Vec::new());
    }
}
