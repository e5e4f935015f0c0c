/// Typed wrapper over the authenticated vendor cloud endpoints
use log::debug;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;

use crate::cloud::session::{Credentials, SessionManager};
use crate::cloud::transport::{HttpRequest, Transport};
use crate::cloud::{APP_CODE, LANG};
use crate::error::CloudError;
use crate::models::{Home, HubDescriptor, HubStatus};

pub const HOME_LIST_PATH: &str = "/app/member/appHome/list";
pub const DEVICES_BY_HOME_PATH: &str = "/app/device/getDeviceByHid";
pub const DEVICE_STATUS_PATH: &str = "/app/device/getDeviceStatus";

#[derive(Deserialize)]
struct Envelope<T> {
    code: Option<i64>,
    data: Option<T>,
}

pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: SessionManager,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, credentials: Credentials) -> Self {
        let session = SessionManager::new(transport.clone(), credentials);
        Self { transport, session }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub async fn list_homes(&self) -> Result<Vec<Home>, CloudError> {
        self.call("list_homes", HttpRequest::get(HOME_LIST_PATH)).await
    }

    pub async fn list_devices(&self, home_id: i64) -> Result<Vec<HubDescriptor>, CloudError> {
        self.call(
            "getDeviceByHid",
            HttpRequest::get(DEVICES_BY_HOME_PATH).query("hid", home_id),
        )
        .await
    }

    pub async fn get_status(&self, hub_id: i64) -> Result<HubStatus, CloudError> {
        self.call(
            "getDeviceStatus",
            HttpRequest::get(DEVICE_STATUS_PATH).query("mid", hub_id),
        )
        .await
    }

    async fn call<T>(&self, operation: &'static str, request: HttpRequest) -> Result<T, CloudError>
    where
        T: DeserializeOwned + Default,
    {
        let token = self.session.ensure_valid().await?;
        let request = request
            .header("auth", token)
            .header("lang", LANG)
            .header("appCode", APP_CODE);

        debug!("API call: {} path={} query={:?}", operation, request.path, request.query);

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| CloudError::api(operation, None, e.to_string()))?;
        if response.status != 200 {
            return Err(CloudError::api(
                operation,
                Some(response.status),
                format!("HTTP {}: {}", response.status, response.body),
            ));
        }

        debug!("API response: {} body={}", operation, response.body);

        let envelope: Envelope<T> = serde_json::from_str(&response.body).map_err(|e| {
            CloudError::api(
                operation,
                Some(response.status),
                format!("malformed response: {e}"),
            )
        })?;
        if envelope.code != Some(0) {
            return Err(CloudError::api(
                operation,
                Some(response.status),
                format!("code {:?}: {}", envelope.code, response.body),
            ));
        }

        Ok(envelope.data.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::session::LOGIN_PATH;
    use crate::cloud::transport::testing::ScriptedTransport;
    use serde_json::json;

    fn client_with(transport: &Arc<ScriptedTransport>) -> ApiClient {
        transport.respond(
            LOGIN_PATH,
            200,
            json!({"code": 0, "data": {"token": "tok", "tokenExpired": 86400}}),
        );
        ApiClient::new(
            transport.clone(),
            Credentials {
                area_code: "31".to_string(),
                email: "user@example.com".to_string(),
                password: "pw".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn list_devices_parses_hubs() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            DEVICES_BY_HOME_PATH,
            200,
            json!({"code": 0, "data": [
                {"mid": 100, "name": "Garden hub", "subDevices": [
                    {"addr": 1, "name": "Bed", "model": "HCS026FRF"}
                ]}
            ]}),
        );
        let client = client_with(&transport);

        let hubs = client.list_devices(7).await.unwrap();
        assert_eq!(hubs.len(), 1);
        assert_eq!(hubs[0].mid, 100);
        assert_eq!(hubs[0].sub_devices[0].model.as_deref(), Some("HCS026FRF"));

        let request = transport
            .requests()
            .into_iter()
            .find(|r| r.path == DEVICES_BY_HOME_PATH)
            .unwrap();
        assert_eq!(request.query, vec![("hid".to_string(), "7".to_string())]);
        assert_eq!(request.header_value("auth"), Some("tok"));
        assert_eq!(request.header_value("lang"), Some("en"));
        assert_eq!(request.header_value("appCode"), Some("1"));
    }

    #[tokio::test]
    async fn missing_or_null_data_defaults_to_empty() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(HOME_LIST_PATH, 200, json!({"code": 0}));
        transport.respond(DEVICE_STATUS_PATH, 200, json!({"code": 0, "data": null}));
        let client = client_with(&transport);

        assert!(client.list_homes().await.unwrap().is_empty());
        assert_eq!(client.get_status(3).await.unwrap(), HubStatus::default());
    }

    #[tokio::test]
    async fn token_is_reused_across_calls() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(HOME_LIST_PATH, 200, json!({"code": 0, "data": [{"hid": 1}]}));
        let client = client_with(&transport);

        client.list_homes().await.unwrap();
        client.list_homes().await.unwrap();
        assert_eq!(transport.count(LOGIN_PATH), 1);
        assert_eq!(transport.count(HOME_LIST_PATH), 2);
    }

    #[tokio::test]
    async fn http_and_application_failures_are_api_errors() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(DEVICE_STATUS_PATH, 502, json!({"code": 0}));
        transport.respond(HOME_LIST_PATH, 200, json!({"code": 4, "msg": "nope"}));
        transport.fail(DEVICES_BY_HOME_PATH, "reset by peer");
        let client = client_with(&transport);

        match client.get_status(9).await {
            Err(CloudError::Api {
                operation, status, ..
            }) => {
                assert_eq!(operation, "getDeviceStatus");
                assert_eq!(status, Some(502));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            client.list_homes().await,
            Err(CloudError::Api {
                operation: "list_homes",
                ..
            })
        ));
        assert!(matches!(
            client.list_devices(1).await,
            Err(CloudError::Api { status: None, .. })
        ));
    }

    #[tokio::test]
    async fn auth_failure_stops_before_api_call() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(LOGIN_PATH, 200, json!({"code": 1}));
        let client = ApiClient::new(
            transport.clone(),
            Credentials {
                area_code: "31".to_string(),
                email: "user@example.com".to_string(),
                password: "wrong".to_string(),
            },
        );

        assert!(matches!(
            client.list_homes().await,
            Err(CloudError::Auth(_))
        ));
        assert_eq!(transport.count(HOME_LIST_PATH), 0);
    }
}
