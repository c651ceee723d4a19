//! Push-subscription coordination for browser and e-mail receivers.

use thiserror::Error;

use crate::client::ClientError;
use crate::models::{DeviceProperties, ReceiverInfo, ServerConfiguration, SubscriptionInfo};

/// Subscription surface of the remote avatar.
#[allow(async_fn_in_trait)]
pub trait SubscriptionSurface {
    async fn get_server_configuration(
        &self,
        avatar_url: &str,
    ) -> Result<ServerConfiguration, ClientError>;

    async fn subscribe(
        &self,
        avatar_url: &str,
        info: &SubscriptionInfo,
        receiver: &ReceiverInfo,
    ) -> Result<(), ClientError>;
}

/// Source of the authenticated user's e-mail claim.
pub trait IdentityProvider {
    fn email(&self) -> Option<String>;
}

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("User not signed-in.")]
    NotSignedIn,

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Builds subscription descriptors and submits them.
///
/// Fire-and-forget: outcomes are reported by the caller, never retried here.
pub struct SubscriptionCoordinator<'a, S> {
    surface: &'a S,
}

impl<'a, S: SubscriptionSurface> SubscriptionCoordinator<'a, S> {
    pub fn new(surface: &'a S) -> Self {
        Self { surface }
    }

    /// The server's push public key for this avatar.
    pub async fn server_public_key(&self, avatar_url: &str) -> Result<String, SubscriptionError> {
        let configuration = self.surface.get_server_configuration(avatar_url).await?;
        Ok(configuration.server_public_key)
    }

    /// Register a browser receiver built from captured device parameters.
    pub async fn subscribe_browser(
        &self,
        avatar_url: &str,
        device: DeviceProperties,
    ) -> Result<(), SubscriptionError> {
        let info = SubscriptionInfo {
            avatar_url: avatar_url.to_string(),
        };
        self.surface
            .subscribe(avatar_url, &info, &ReceiverInfo::Browser(device))
            .await?;
        Ok(())
    }

    /// Register an e-mail receiver for the authenticated identity.
    ///
    /// Returns the subscribed address, or [`SubscriptionError::NotSignedIn`]
    /// when no e-mail claim is available.
    pub async fn subscribe_email<I: IdentityProvider>(
        &self,
        avatar_url: &str,
        identity: &I,
    ) -> Result<String, SubscriptionError> {
        let email_address = identity.email().ok_or(SubscriptionError::NotSignedIn)?;
        let info = SubscriptionInfo {
            avatar_url: avatar_url.to_string(),
        };
        self.surface
            .subscribe(
                avatar_url,
                &info,
                &ReceiverInfo::Smtp {
                    email_address: email_address.clone(),
                },
            )
            .await?;
        Ok(email_address)
    }
}
