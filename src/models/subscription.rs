use serde::{Deserialize, Serialize};

/// Identifies the avatar a subscription is registered against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionInfo {
    pub avatar_url: String,
}

/// Push parameters captured from the subscribing browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceProperties {
    pub name: String,
    #[serde(rename = "pushAuth")]
    pub push_auth: String,
    #[serde(rename = "pushEndpoint")]
    pub push_endpoint: String,
    #[serde(rename = "pushP256DH")]
    pub push_p256dh: String,
}

/// Where subscription notifications are delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReceiverInfo {
    Browser(DeviceProperties),
    Smtp {
        #[serde(rename = "emailAddress")]
        email_address: String,
    },
}

/// Push configuration published by the avatar server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfiguration {
    pub server_public_key: String,
}
