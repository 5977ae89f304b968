//! Payroll HTTP client.
//!
//! Blocking reqwest client with bearer auth. Runs on the remote worker
//! thread in the terminal app and directly in CLI commands.

use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use super::timeline::{ISO_FORMAT, TimelineSettings, build_daily_timeline};
use super::{
    RemoteError, RemoteProject, RemoteResult, RemoteService, ReportItem, ReportResponse,
};
use crate::config::RemoteConfig;

pub struct PayrollClient {
    http: reqwest::blocking::Client,
    api_root: String,
    client_id: String,
    user_id: String,
    organization_id: String,
    refresh_token: Option<String>,
    access_token: Option<String>,
    timeline: TimelineSettings,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct ClientSettings {
    #[serde(default)]
    projects: Vec<RemoteProject>,
}

impl PayrollClient {
    pub fn from_config(config: &RemoteConfig) -> RemoteResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("timegrid/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        Ok(Self {
            http,
            api_root: config.api_root.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            user_id: config.user_id.clone(),
            organization_id: config.organization_id.clone(),
            refresh_token: config.refresh_token.clone(),
            access_token: config.access_token.clone(),
            timeline: config.timeline(),
        })
    }

    /// True when a refresh token is configured but no access token yet.
    pub fn needs_refresh(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_some()
    }

    /// Refresh first when only a refresh token is configured.
    pub fn ensure_token(&mut self) -> RemoteResult<()> {
        if self.needs_refresh() {
            self.refresh_access_token()?;
        }
        Ok(())
    }

    fn token(&self) -> RemoteResult<&str> {
        self.access_token
            .as_deref()
            .ok_or(RemoteError::NotAuthenticated)
    }

    fn user_url(&self, path: &str) -> String {
        format!("{}/v1/_/reporting/user/{}/{path}", self.api_root, self.user_id)
    }

    fn check(response: reqwest::blocking::Response) -> RemoteResult<reqwest::blocking::Response> {
        let status = response.status().as_u16();
        if status >= 300 {
            let body = response.text().unwrap_or_default();
            log::warn!("Payroll service answered {status}: {body}");
            return Err(RemoteError::Http(status, body));
        }
        Ok(response)
    }

    fn send(
        &self,
        request: reqwest::blocking::RequestBuilder,
    ) -> RemoteResult<reqwest::blocking::Response> {
        let response = request
            .bearer_auth(self.token()?)
            .send()
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        Self::check(response)
    }

    fn parse<T: DeserializeOwned>(response: reqwest::blocking::Response) -> RemoteResult<T> {
        response.json::<T>().map_err(|e| RemoteError::Parse(e.to_string()))
    }
}

impl RemoteService for PayrollClient {
    fn refresh_access_token(&mut self) -> RemoteResult<()> {
        let refresh_token = self
            .refresh_token
            .as_deref()
            .ok_or(RemoteError::NotAuthenticated)?;
        let url = format!("{}/v1/auth/refresh", self.api_root);
        let response = self
            .http
            .post(&url)
            .json(&json!({ "clientId": self.client_id, "refreshToken": refresh_token }))
            .send()
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        let body: RefreshResponse = Self::parse(Self::check(response)?)?;
        self.access_token = Some(body.access_token);
        log::info!("Refreshed payroll access token");
        Ok(())
    }

    fn list_reports(&self, start: NaiveDate, end: NaiveDate) -> RemoteResult<ReportResponse> {
        let start_date = start
            .and_hms_milli_opt(0, 0, 0, 0)
            .map(|t| t.format(ISO_FORMAT).to_string())
            .ok_or_else(|| RemoteError::InvalidInput(start.to_string()))?;
        let end_date = end
            .and_hms_milli_opt(23, 59, 59, 999)
            .map(|t| t.format(ISO_FORMAT).to_string())
            .ok_or_else(|| RemoteError::InvalidInput(end.to_string()))?;

        log::debug!("Listing reports {start} .. {end}");
        let request = self.http.get(self.user_url("activities")).query(&[
            ("startDate", start_date.as_str()),
            ("endDate", end_date.as_str()),
            ("lang", "sv"),
        ]);
        Self::parse(self.send(request)?)
    }

    fn report_hours(&self, date: NaiveDate, items: &[ReportItem]) -> RemoteResult<usize> {
        let payload = build_daily_timeline(date, items, &self.timeline);
        if payload.is_empty() {
            return Err(RemoteError::InvalidInput(format!("no hours to report on {date}")));
        }
        log::info!("Reporting {} block(s) on {date}", payload.len());
        let request = self
            .http
            .post(self.user_url("presence/reports"))
            .json(&json!({ "items": payload }));
        self.send(request)?;
        Ok(payload.len())
    }

    fn delete_reports(&self, ids: &[String]) -> RemoteResult<()> {
        log::info!("Deleting {} report(s)", ids.len());
        let request = self
            .http
            .delete(self.user_url("presence/reports"))
            .json(&json!({ "reportIds": ids }));
        self.send(request)?;
        Ok(())
    }

    fn verify_days(&self, dates: &[NaiveDate]) -> RemoteResult<()> {
        if dates.is_empty() {
            return Err(RemoteError::InvalidInput("expected dates to verify".into()));
        }
        let dates: Vec<String> = dates.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect();
        log::info!("Verifying {}", dates.join(", "));
        let request = self
            .http
            .patch(self.user_url("verify-days"))
            .json(&json!({ "dates": dates }));
        self.send(request)?;
        Ok(())
    }

    fn get_projects(&self) -> RemoteResult<Vec<RemoteProject>> {
        let url = format!(
            "{}/v1/organizations/{}/client-settings",
            self.api_root, self.organization_id
        );
        let settings: ClientSettings = Self::parse(self.send(self.http.get(url))?)?;
        Ok(settings.projects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RemoteConfig {
        RemoteConfig {
            api_root: "https://payroll.invalid/".into(),
            user_id: "u1".into(),
            ..RemoteConfig::default()
        }
    }

    #[test]
    fn user_urls_are_built_from_root() {
        let client = PayrollClient::from_config(&config()).unwrap();
        assert_eq!(
            client.user_url("verify-days"),
            "https://payroll.invalid/v1/_/reporting/user/u1/verify-days"
        );
    }

    #[test]
    fn missing_tokens_fail_before_any_request() {
        let mut client = PayrollClient::from_config(&config()).unwrap();
        assert!(!client.needs_refresh());
        assert!(matches!(
            client.get_projects(),
            Err(RemoteError::NotAuthenticated)
        ));
        assert!(matches!(
            client.refresh_access_token(),
            Err(RemoteError::NotAuthenticated)
        ));
    }

    #[test]
    fn empty_verify_is_rejected() {
        let mut cfg = config();
        cfg.access_token = Some("t".into());
        let client = PayrollClient::from_config(&cfg).unwrap();
        assert!(matches!(
            client.verify_days(&[]),
            Err(RemoteError::InvalidInput(_))
        ));
    }

    #[test]
    fn refresh_needed_with_only_refresh_token() {
        let mut cfg = config();
        cfg.refresh_token = Some("r".into());
        let client = PayrollClient::from_config(&cfg).unwrap();
        assert!(client.needs_refresh());
    }
}
