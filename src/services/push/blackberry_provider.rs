//! BlackBerry PAP provider implementation.
//!
//! The PAP gateway takes one PIN per physical request: a multipart/related
//! POST whose first part is the XML control entity (push-id, source
//! reference, delivery deadline, address) and whose second part carries the
//! JSON message. The reply is XML with at most one failure descriptor.

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use quick_xml::Reader;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::writer::Writer;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use super::provider::PushProvider;
use crate::config::BlackberryConfig;
use crate::error::{AppError, AppResult};
use crate::external::transport::{HttpReply, HttpTransport};
use crate::models::{DispatchRequest, PushMessage, PushResponse, PushStatus};

const PAP_DOCTYPE: &str = r#"pap PUBLIC "-//WAPFORUM//DTD PAP 2.1//EN" "http://www.openmobilealliance.org/tech/DTD/pap_2.1.dtd""#;

/// Failure descriptor extracted from a PAP reply.
#[derive(Debug, PartialEq)]
struct PapResult {
    code: Option<String>,
    description: String,
}

/// BlackBerry push provider
pub struct BlackberryProvider {
    config: BlackberryConfig,
    transport: Arc<dyn HttpTransport>,
}

impl BlackberryProvider {
    /// Creates a new BlackBerry provider with configuration and transport
    pub fn new(config: BlackberryConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    fn request_headers(&self, boundary: &str) -> HashMap<String, String> {
        let credentials = BASE64.encode(format!(
            "{}:{}",
            self.config.application_id, self.config.password
        ));
        HashMap::from([
            (
                "Content-Type".to_string(),
                format!("multipart/related; boundary={boundary}; type=\"application/xml\""),
            ),
            ("Authorization".to_string(), format!("Basic {credentials}")),
        ])
    }

    /// Writes the PAP control entity for one PIN.
    fn build_control_entity(
        &self,
        endpoint: &str,
        push_id: &str,
        deliver_before: &str,
    ) -> anyhow::Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;
        writer.write_event(Event::DocType(BytesText::from_escaped(PAP_DOCTYPE)))?;

        writer.write_event(Event::Start(BytesStart::new("pap")))?;

        let mut push_message = BytesStart::new("push-message");
        push_message.push_attribute(("push-id", push_id));
        push_message.push_attribute((
            "source-reference",
            self.config.application_id.as_str(),
        ));
        push_message.push_attribute(("deliver-before-timestamp", deliver_before));
        writer.write_event(Event::Start(push_message))?;

        let mut address = BytesStart::new("address");
        address.push_attribute(("address-value", endpoint));
        writer.write_event(Event::Empty(address))?;

        let mut qos = BytesStart::new("quality-of-service");
        qos.push_attribute(("delivery-method", "unconfirmed"));
        writer.write_event(Event::Empty(qos))?;

        writer.write_event(Event::End(BytesEnd::new("push-message")))?;
        writer.write_event(Event::End(BytesEnd::new("pap")))?;

        Ok(writer.into_inner())
    }

    fn build_data_entity(&self, message: &PushMessage) -> anyhow::Result<Vec<u8>> {
        let mut body = json!({ "body": message.body });
        if let Some(title) = &message.title {
            body["title"] = json!(title);
        }
        if !message.data.is_empty() {
            body["data"] = json!(message.data);
        }
        Ok(serde_json::to_vec(&body)?)
    }

    fn build_multipart(boundary: &str, control: &[u8], data: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!("--{boundary}\r\nContent-Type: application/xml; charset=UTF-8\r\n\r\n")
                .as_bytes(),
        );
        body.extend_from_slice(control);
        body.extend_from_slice(
            format!("\r\n--{boundary}\r\nContent-Type: application/json\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        body
    }

    /// Sends one PAP request for one PIN and classifies its reply.
    async fn push_single(&self, endpoint: &str, message: &PushMessage) -> PushStatus {
        let push_id = uuid::Uuid::new_v4().to_string();
        let deliver_before = match self.deliver_before() {
            Ok(ts) => ts,
            Err(e) => {
                warn!(endpoint = %endpoint, error = %e, "Could not compute delivery deadline");
                return PushStatus::Error;
            }
        };

        let entities = self
            .build_control_entity(endpoint, &push_id, &deliver_before)
            .and_then(|control| Ok((control, self.build_data_entity(message)?)));
        let (control, data) = match entities {
            Ok(parts) => parts,
            Err(e) => {
                warn!(endpoint = %endpoint, error = %e, "Could not build push request");
                return PushStatus::Error;
            }
        };

        let boundary = format!("pushgate-{:016x}", rand::random::<u64>());
        let body = Self::build_multipart(&boundary, &control, &data);
        let headers = self.request_headers(&boundary);

        match self.transport.post(&self.config.api_url, &headers, body).await {
            Ok(reply) => self.classify_reply(endpoint, &reply),
            Err(e) => {
                warn!(endpoint = %endpoint, error = %e, "Gateway unreachable");
                PushStatus::Error
            }
        }
    }

    fn deliver_before(&self) -> AppResult<String> {
        let now = jiff::Timestamp::now();
        let deadline = jiff::Timestamp::from_second(
            now.as_second() + self.config.deliver_before_secs as i64,
        )
        .map_err(|e| AppError::Internal { source: e.into() })?;
        Ok(deadline.to_string())
    }

    fn classify_reply(&self, endpoint: &str, reply: &HttpReply) -> PushStatus {
        if !reply.is_ok() {
            let status = classify_http_status(reply.status);
            warn!(endpoint = %endpoint, status = reply.status, "Gateway rejected push request");
            return status;
        }

        let result = match parse_reply(&reply.body) {
            Ok(result) => result,
            Err(e) => {
                warn!(endpoint = %endpoint, error = %e, "Could not parse gateway reply");
                return PushStatus::Error;
            }
        };

        let Some(result) = result else {
            return PushStatus::Success;
        };

        match result.code.as_deref().and_then(|c| c.parse::<u32>().ok()) {
            // 1000 accepted / 1001 queued: not a failure
            Some(code) if code < 2000 => PushStatus::Success,
            Some(code) => {
                let status = classify_pap_code(code);
                warn!(
                    endpoint = %endpoint,
                    code,
                    description = %result.description,
                    "Push rejected by gateway"
                );
                status
            }
            None => {
                warn!(
                    endpoint = %endpoint,
                    description = %result.description,
                    "Push rejected by gateway"
                );
                PushStatus::Unknown
            }
        }
    }
}

#[async_trait]
impl PushProvider for BlackberryProvider {
    async fn push(&self, request: &DispatchRequest) -> AppResult<PushResponse> {
        // One physical request per PIN; each reply answers only for its own
        // endpoint, so every endpoint becomes its own response part.
        let mut parts = Vec::new();
        for endpoint in request.endpoints() {
            let status = self.push_single(endpoint, request.message()).await;
            parts.push(PushResponse::from_statuses(HashMap::from([(
                endpoint.clone(),
                status,
            )])));
        }
        Ok(PushResponse::aggregate(parts))
    }

    fn name(&self) -> &'static str {
        "blackberry"
    }
}

fn classify_http_status(status: u16) -> PushStatus {
    match status {
        400 => PushStatus::Error,
        401 => PushStatus::InvalidEndpoint,
        500 | 503 => PushStatus::Error,
        _ => PushStatus::Unknown,
    }
}

/// PAP result codes: addressing errors mark the PIN itself dead, busy
/// conditions are worth retrying, a bad request will never succeed.
fn classify_pap_code(code: u32) -> PushStatus {
    match code {
        2002 => PushStatus::InvalidEndpoint,
        4000 | 4001 => PushStatus::TemporaryError,
        2000 => PushStatus::Error,
        _ => PushStatus::Unknown,
    }
}

/// Extracts the first failure descriptor from a PAP reply, if any.
fn parse_reply(xml: &str) -> Result<Option<PapResult>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(element) | Event::Empty(element) => {
                let name = element.local_name();
                if name.as_ref() != b"response-result" && name.as_ref() != b"badmessage-response" {
                    continue;
                }
                let mut code = None;
                let mut description = String::new();
                for attr in element.attributes().flatten() {
                    match attr.key.local_name().as_ref() {
                        b"code" => {
                            code = Some(String::from_utf8_lossy(&attr.value).into_owned());
                        }
                        b"desc" => {
                            description = String::from_utf8_lossy(&attr.value).into_owned();
                        }
                        _ => {}
                    }
                }
                return Ok(Some(PapResult { code, description }));
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct RecordedCall {
        url: String,
        headers: HashMap<String, String>,
        body: String,
    }

    enum Scripted {
        Reply(u16, &'static str),
        ConnectionFailure,
    }

    struct MockTransport {
        replies: Mutex<VecDeque<Scripted>>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl MockTransport {
        fn new(replies: Vec<Scripted>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<RecordedCall> {
            std::mem::take(&mut self.calls.lock().unwrap())
        }
    }

    #[async_trait]
    impl HttpTransport for MockTransport {
        async fn post(
            &self,
            url: &str,
            headers: &HashMap<String, String>,
            body: Vec<u8>,
        ) -> AppResult<HttpReply> {
            self.calls.lock().unwrap().push(RecordedCall {
                url: url.to_string(),
                headers: headers.clone(),
                body: String::from_utf8(body).unwrap(),
            });
            match self.replies.lock().unwrap().pop_front().expect("unscripted call") {
                Scripted::Reply(status, body) => Ok(HttpReply {
                    status,
                    body: body.to_string(),
                }),
                Scripted::ConnectionFailure => Err(AppError::Gateway {
                    gateway: "blackberry".to_string(),
                    message: "connection refused".to_string(),
                    source: None,
                }),
            }
        }
    }

    const ACCEPTED_REPLY: &str = r#"<?xml version="1.0"?>
<pap><push-response push-id="x"><response-result code="1000" desc="The request completed successfully."/></push-response></pap>"#;

    fn failure_reply(code: &str, desc: &str) -> String {
        format!(
            r#"<?xml version="1.0"?><pap><push-response push-id="x"><response-result code="{code}" desc="{desc}"/></push-response></pap>"#
        )
    }

    fn provider(transport: Arc<MockTransport>) -> BlackberryProvider {
        BlackberryProvider::new(
            BlackberryConfig {
                enabled: true,
                application_id: "app-123".to_string(),
                password: "secret".to_string(),
                ..Default::default()
            },
            transport,
        )
    }

    fn request(endpoints: &[&str]) -> DispatchRequest {
        DispatchRequest::new(
            endpoints.iter().map(|e| e.to_string()).collect(),
            PushMessage::new("test body"),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_accepted_reply_is_success() {
        let transport = MockTransport::new(vec![Scripted::Reply(200, ACCEPTED_REPLY)]);
        let response = provider(transport).push(&request(&["pin-1"])).await.unwrap();
        assert_eq!(response.status("pin-1"), PushStatus::Success);
    }

    #[tokio::test]
    async fn test_foreign_endpoint_is_unknown() {
        let transport = MockTransport::new(vec![Scripted::Reply(200, ACCEPTED_REPLY)]);
        let response = provider(transport).push(&request(&["pin-1"])).await.unwrap();
        assert_eq!(response.status("pin-2"), PushStatus::Unknown);
    }

    #[tokio::test]
    async fn test_unrecognized_pin_is_invalid_endpoint() {
        let body = failure_reply("2002", "The address is not valid.");
        let transport = MockTransport::new(vec![Scripted::Reply(
            200,
            Box::leak(body.into_boxed_str()),
        )]);
        let response = provider(transport).push(&request(&["pin-1"])).await.unwrap();
        assert_eq!(response.status("pin-1"), PushStatus::InvalidEndpoint);
    }

    #[tokio::test]
    async fn test_busy_gateway_is_temporary() {
        let body = failure_reply("4001", "Service busy.");
        let transport = MockTransport::new(vec![Scripted::Reply(
            200,
            Box::leak(body.into_boxed_str()),
        )]);
        let response = provider(transport).push(&request(&["pin-1"])).await.unwrap();
        assert_eq!(response.status("pin-1"), PushStatus::TemporaryError);
    }

    #[tokio::test]
    async fn test_bad_request_code_is_error() {
        let body = failure_reply("2000", "Bad request.");
        let transport = MockTransport::new(vec![Scripted::Reply(
            200,
            Box::leak(body.into_boxed_str()),
        )]);
        let response = provider(transport).push(&request(&["pin-1"])).await.unwrap();
        assert_eq!(response.status("pin-1"), PushStatus::Error);
    }

    #[tokio::test]
    async fn test_unrecognized_pap_code_is_unknown() {
        let body = failure_reply("9999", "From the future.");
        let transport = MockTransport::new(vec![Scripted::Reply(
            200,
            Box::leak(body.into_boxed_str()),
        )]);
        let response = provider(transport).push(&request(&["pin-1"])).await.unwrap();
        assert_eq!(response.status("pin-1"), PushStatus::Unknown);
    }

    #[tokio::test]
    async fn test_malformed_xml_is_error() {
        let transport = MockTransport::new(vec![Scripted::Reply(200, "<pap><unclosed")]);
        let response = provider(transport).push(&request(&["pin-1"])).await.unwrap();
        assert_eq!(response.status("pin-1"), PushStatus::Error);
    }

    #[tokio::test]
    async fn test_http_status_table() {
        for (status, expected) in [
            (400, PushStatus::Error),
            (401, PushStatus::InvalidEndpoint),
            (500, PushStatus::Error),
            (503, PushStatus::Error),
            (502, PushStatus::Unknown),
            (418, PushStatus::Unknown),
        ] {
            let transport = MockTransport::new(vec![Scripted::Reply(status, "ignored")]);
            let response = provider(transport).push(&request(&["pin-1"])).await.unwrap();
            assert_eq!(response.status("pin-1"), expected, "HTTP {status}");
        }
    }

    #[tokio::test]
    async fn test_transport_failure_is_error() {
        let transport = MockTransport::new(vec![Scripted::ConnectionFailure]);
        let response = provider(transport).push(&request(&["pin-1"])).await.unwrap();
        assert_eq!(response.status("pin-1"), PushStatus::Error);
    }

    #[tokio::test]
    async fn test_one_request_per_endpoint() {
        let body = failure_reply("2002", "The address is not valid.");
        let transport = MockTransport::new(vec![
            Scripted::Reply(200, ACCEPTED_REPLY),
            Scripted::Reply(200, Box::leak(body.into_boxed_str())),
        ]);
        let bb = provider(transport.clone());
        let response = bb.push(&request(&["pin-1", "pin-2"])).await.unwrap();

        assert_eq!(transport.calls().len(), 2);
        assert_eq!(response.part_count(), 2);
        assert_eq!(response.status("pin-1"), PushStatus::Success);
        assert_eq!(response.status("pin-2"), PushStatus::InvalidEndpoint);
    }

    #[tokio::test]
    async fn test_request_shape() {
        let transport = MockTransport::new(vec![Scripted::Reply(200, ACCEPTED_REPLY)]);
        let bb = provider(transport.clone());
        bb.push(&request(&["pin-1"])).await.unwrap();

        let calls = transport.calls();
        let call = &calls[0];
        assert_eq!(call.url, BlackberryConfig::default().api_url);

        let content_type = &call.headers["Content-Type"];
        assert!(content_type.starts_with("multipart/related; boundary=pushgate-"));
        assert!(content_type.ends_with("type=\"application/xml\""));

        let credentials = BASE64.encode("app-123:secret");
        assert_eq!(call.headers["Authorization"], format!("Basic {credentials}"));

        assert!(call.body.contains(r#"address-value="pin-1""#));
        assert!(call.body.contains(r#"source-reference="app-123""#));
        assert!(call.body.contains("deliver-before-timestamp="));
        assert!(call.body.contains("Content-Type: application/json"));
        assert!(call.body.contains(r#""body":"test body""#));
        // closing boundary terminates the entity
        assert!(call.body.trim_end().ends_with("--"));
    }

    #[test]
    fn test_parse_reply_extracts_failure() {
        let result = parse_reply(&failure_reply("2002", "The address is not valid."))
            .unwrap()
            .unwrap();
        assert_eq!(result.code.as_deref(), Some("2002"));
        assert_eq!(result.description, "The address is not valid.");
    }

    #[test]
    fn test_parse_reply_without_result_element() {
        let result = parse_reply(r#"<?xml version="1.0"?><pap></pap>"#).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_parse_reply_reads_badmessage_response() {
        let xml = r#"<pap><badmessage-response code="2000" desc="Malformed request."/></pap>"#;
        let result = parse_reply(xml).unwrap().unwrap();
        assert_eq!(result.code.as_deref(), Some("2000"));
    }
}
