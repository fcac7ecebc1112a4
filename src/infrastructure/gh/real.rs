use std::time::Instant;

use anyhow::Result;
use async_trait::async_trait;

use super::Gh;

/// 실제 `gh` CLI를 호출하는 구현체
pub struct RealGh;

fn push_host(args: &mut Vec<String>, host: Option<&str>) {
    if let Some(h) = host {
        args.push("--hostname".to_string());
        args.push(h.to_string());
    }
}

/// 조회성 호출: 성공 시 stdout bytes, 실패 시 Err
async fn gh_bytes(op: &str, args: Vec<String>) -> Result<Vec<u8>> {
    tracing::debug!("[gh:{op}] >>> gh {}", args.join(" "));
    let start = Instant::now();

    let output = tokio::process::Command::new("gh").args(&args).output().await?;

    let elapsed = start.elapsed();

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::warn!(
            "[gh:{op}] <<< FAILED (exit={}, {}ms): {}",
            output.status.code().unwrap_or(-1),
            elapsed.as_millis(),
            stderr.trim()
        );
        anyhow::bail!("gh api error ({}ms): {stderr}", elapsed.as_millis());
    }

    tracing::debug!(
        "[gh:{op}] <<< OK ({}ms, {} bytes)",
        elapsed.as_millis(),
        output.stdout.len()
    );
    Ok(output.stdout)
}

/// 뮤테이션 호출: 실패는 로깅만 하고 false 반환 (best effort)
async fn gh_mutate(op: &str, args: Vec<String>) -> bool {
    tracing::debug!("[gh:{op}] >>> gh {}", args.join(" "));
    let start = Instant::now();

    match tokio::process::Command::new("gh").args(&args).output().await {
        Ok(output) => {
            let elapsed = start.elapsed();
            if output.status.success() {
                tracing::debug!("[gh:{op}] <<< OK ({}ms)", elapsed.as_millis());
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr);
                tracing::warn!(
                    "[gh:{op}] <<< FAILED (exit={}, {}ms): {}",
                    output.status.code().unwrap_or(-1),
                    elapsed.as_millis(),
                    stderr.trim()
                );
            }
            output.status.success()
        }
        Err(e) => {
            tracing::warn!("[gh:{op}] <<< ERROR ({}ms): {e}", start.elapsed().as_millis());
            false
        }
    }
}

#[async_trait]
impl Gh for RealGh {
    async fn search_issues(
        &self,
        params: &[(&str, &str)],
        host: Option<&str>,
    ) -> Result<Vec<u8>> {
        let mut args = vec![
            "api".to_string(),
            "search/issues".to_string(),
            "--method".to_string(),
            "GET".to_string(),
            "--jq".to_string(),
            ".items".to_string(),
        ];

        for (key, val) in params {
            args.push("-f".to_string());
            args.push(format!("{key}={val}"));
        }

        push_host(&mut args, host);
        gh_bytes("search_issues", args).await
    }

    async fn label_get(
        &self,
        repo_name: &str,
        name: &str,
        host: Option<&str>,
    ) -> Result<Option<String>> {
        let mut args = vec![
            "api".to_string(),
            format!("repos/{repo_name}/labels/{name}"),
            "--jq".to_string(),
            ".name".to_string(),
        ];
        push_host(&mut args, host);

        tracing::debug!("[gh:label_get] >>> gh {}", args.join(" "));
        let start = Instant::now();

        let output = tokio::process::Command::new("gh").args(&args).output().await?;

        let elapsed = start.elapsed();

        if output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
            tracing::debug!("[gh:label_get] <<< OK ({}ms)", elapsed.as_millis());
            return Ok(Some(stdout));
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        // 404는 "라벨 없음" — 생성 경로로 넘어간다
        if stderr.contains("HTTP 404") {
            tracing::debug!("[gh:label_get] <<< not found ({}ms)", elapsed.as_millis());
            return Ok(None);
        }

        tracing::warn!(
            "[gh:label_get] <<< FAILED (exit={}, {}ms): {}",
            output.status.code().unwrap_or(-1),
            elapsed.as_millis(),
            stderr.trim()
        );
        anyhow::bail!("label lookup failed for {repo_name}: {stderr}");
    }

    async fn label_create(
        &self,
        repo_name: &str,
        name: &str,
        color: &str,
        host: Option<&str>,
    ) -> bool {
        let mut args = vec![
            "api".to_string(),
            format!("repos/{repo_name}/labels"),
            "--method".to_string(),
            "POST".to_string(),
            "--silent".to_string(),
            "-f".to_string(),
            format!("name={name}"),
            "-f".to_string(),
            format!("color={color}"),
        ];
        push_host(&mut args, host);
        gh_mutate("label_create", args).await
    }

    async fn issue_comment(
        &self,
        repo_name: &str,
        number: i64,
        body: &str,
        host: Option<&str>,
    ) -> bool {
        let mut args = vec![
            "issue".to_string(),
            "comment".to_string(),
            number.to_string(),
            "--repo".to_string(),
            repo_name.to_string(),
            "--body".to_string(),
            body.to_string(),
        ];
        push_host(&mut args, host);
        gh_mutate("issue_comment", args).await
    }

    async fn label_add(
        &self,
        repo_name: &str,
        number: i64,
        label: &str,
        host: Option<&str>,
    ) -> bool {
        let mut args = vec![
            "api".to_string(),
            format!("repos/{repo_name}/issues/{number}/labels"),
            "--method".to_string(),
            "POST".to_string(),
            "--silent".to_string(),
            "-f".to_string(),
            format!("labels[]={label}"),
        ];
        push_host(&mut args, host);
        gh_mutate("label_add", args).await
    }

    async fn label_remove(
        &self,
        repo_name: &str,
        number: i64,
        label: &str,
        host: Option<&str>,
    ) -> bool {
        let mut args = vec![
            "api".to_string(),
            format!("repos/{repo_name}/issues/{number}/labels/{label}"),
            "--method".to_string(),
            "DELETE".to_string(),
            "--silent".to_string(),
        ];
        push_host(&mut args, host);
        gh_mutate("label_remove", args).await
    }

    async fn issue_close(&self, repo_name: &str, number: i64, host: Option<&str>) -> bool {
        let mut args = vec![
            "api".to_string(),
            format!("repos/{repo_name}/issues/{number}"),
            "--method".to_string(),
            "PATCH".to_string(),
            "--silent".to_string(),
            "-f".to_string(),
            "state=closed".to_string(),
        ];
        push_host(&mut args, host);
        gh_mutate("issue_close", args).await
    }

    async fn org_teams(&self, org: &str, host: Option<&str>) -> Result<Vec<u8>> {
        let mut args = vec![
            "api".to_string(),
            format!("orgs/{org}/teams"),
            "--paginate".to_string(),
        ];
        push_host(&mut args, host);
        gh_bytes("org_teams", args).await
    }

    async fn team_repos(&self, org: &str, slug: &str, host: Option<&str>) -> Result<Vec<u8>> {
        let mut args = vec![
            "api".to_string(),
            format!("orgs/{org}/teams/{slug}/repos"),
            "--paginate".to_string(),
        ];
        push_host(&mut args, host);
        gh_bytes("team_repos", args).await
    }
}
