//! E-invoice account linkage.
//!
//! The linked flag always comes from `/api/einvoice/status`: it is read when
//! an e-invoice command starts and re-read after every successful change. A
//! failed remote call never moves the state, and a failed re-read after a
//! change that landed does not fail the change.

use crate::api::{Backend, CarrierCredentials, LinkAction};
use crate::error::{ReceiptsError, Result};
use crate::models::LinkStatus;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LinkageState {
    #[default]
    Unlinked,
    Linked { username: Option<String> },
}

impl From<LinkStatus> for LinkageState {
    fn from(status: LinkStatus) -> Self {
        if status.linked {
            LinkageState::Linked {
                username: status.username.filter(|u| !u.is_empty()),
            }
        } else {
            LinkageState::Unlinked
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlinkOutcome {
    Unlinked,
    Cancelled,
}

#[derive(Debug, Default)]
pub struct EInvoiceAccount {
    state: LinkageState,
}

impl EInvoiceAccount {
    /// Start from the server's current view of the linkage.
    pub fn fetch(backend: &dyn Backend) -> Result<Self> {
        let mut account = Self::default();
        account.refresh(backend)?;
        Ok(account)
    }

    pub fn state(&self) -> &LinkageState {
        &self.state
    }

    pub fn is_linked(&self) -> bool {
        matches!(self.state, LinkageState::Linked { .. })
    }

    pub fn refresh(&mut self, backend: &dyn Backend) -> Result<&LinkageState> {
        let status = backend.einvoice_status()?;
        self.state = status.into();
        Ok(&self.state)
    }

    /// The server already applied the change; a failed re-read keeps the old state.
    fn refresh_after_change(&mut self, backend: &dyn Backend) {
        if let Err(e) = self.refresh(backend) {
            tracing::warn!(error = %e, "could not refresh e-invoice status after the change");
        }
    }

    /// Which remote operation a credential submission maps to right now.
    pub fn route(&self) -> LinkAction {
        if self.is_linked() {
            LinkAction::Edit
        } else {
            LinkAction::Create
        }
    }

    pub fn submit_credentials(
        &mut self,
        backend: &dyn Backend,
        creds: &CarrierCredentials,
    ) -> Result<LinkAction> {
        if creds.username.trim().is_empty() {
            return Err(ReceiptsError::Validation("E-invoice username is required".to_string()));
        }
        if creds.password.is_empty() {
            return Err(ReceiptsError::Validation("E-invoice password is required".to_string()));
        }

        let action = self.route();
        backend
            .submit_einvoice_login(action, creds)
            .map_err(|e| e.or_message("Operation failed"))?;
        self.refresh_after_change(backend);
        Ok(action)
    }

    /// Unlink after `confirm` agrees; a refusal never touches the server.
    pub fn unlink(
        &mut self,
        backend: &dyn Backend,
        confirm: impl FnOnce() -> bool,
    ) -> Result<UnlinkOutcome> {
        if !self.is_linked() {
            return Err(ReceiptsError::Other("No e-invoice account is linked.".to_string()));
        }
        if !confirm() {
            return Ok(UnlinkOutcome::Cancelled);
        }
        backend
            .delete_einvoice_login()
            .map_err(|e| e.or_message("Unlink failed"))?;
        self.refresh_after_change(backend);
        Ok(UnlinkOutcome::Unlinked)
    }
}

#[cfg(test)]
mod tests {
    use zeroize::Zeroizing;

    use super::*;
    use crate::api::mock::MockBackend;
    use crate::api::Endpoint;

    fn username(account: &EInvoiceAccount) -> Option<&str> {
        match account.state() {
            LinkageState::Linked { username } => username.as_deref(),
            LinkageState::Unlinked => None,
        }
    }

    fn creds(username: &str) -> CarrierCredentials {
        CarrierCredentials {
            username: username.to_string(),
            password: Zeroizing::new("carrier-pass".to_string()),
        }
    }

    #[test]
    fn test_fetch_reads_status() {
        let backend = MockBackend::linked("/ABC+123");
        let account = EInvoiceAccount::fetch(&backend).unwrap();
        assert!(account.is_linked());
        assert_eq!(username(&account), Some("/ABC+123"));
        assert_eq!(backend.calls(), vec![Endpoint::EInvoiceStatus]);
    }

    #[test]
    fn test_submit_while_unlinked_creates() {
        let backend = MockBackend::default();
        let mut account = EInvoiceAccount::fetch(&backend).unwrap();
        let action = account.submit_credentials(&backend, &creds("/NEW")).unwrap();
        assert_eq!(action, LinkAction::Create);
        assert_eq!(
            account.state(),
            &LinkageState::Linked {
                username: Some("/NEW".to_string())
            }
        );
        assert_eq!(
            backend.calls(),
            vec![Endpoint::EInvoiceStatus, Endpoint::LinkCreate, Endpoint::EInvoiceStatus]
        );
    }

    #[test]
    fn test_submit_while_linked_edits_never_creates() {
        let backend = MockBackend::linked("/OLD");
        let mut account = EInvoiceAccount::fetch(&backend).unwrap();
        let action = account.submit_credentials(&backend, &creds("/NEW")).unwrap();
        assert_eq!(action, LinkAction::Edit);
        assert!(backend.calls().contains(&Endpoint::LinkEdit));
        assert!(!backend.calls().contains(&Endpoint::LinkCreate));
        assert_eq!(username(&account), Some("/NEW"));
    }

    #[test]
    fn test_routing_uses_linked_flag_only() {
        // Linked without a username is still linked.
        let backend = MockBackend::default();
        *backend.status.borrow_mut() = LinkStatus {
            linked: true,
            username: None,
        };
        let account = EInvoiceAccount::fetch(&backend).unwrap();
        assert_eq!(account.route(), LinkAction::Edit);

        *backend.status.borrow_mut() = LinkStatus {
            linked: false,
            username: Some("/STALE".to_string()),
        };
        let account = EInvoiceAccount::fetch(&backend).unwrap();
        assert_eq!(account.route(), LinkAction::Create);
    }

    #[test]
    fn test_rejected_submit_leaves_state() {
        let backend = MockBackend::default();
        let mut account = EInvoiceAccount::fetch(&backend).unwrap();
        backend.reject_mutations.set(true);
        let err = account.submit_credentials(&backend, &creds("/NEW")).unwrap_err();
        assert_eq!(err.to_string(), "rejected");
        assert_eq!(account.state(), &LinkageState::Unlinked);
        assert_eq!(backend.calls().last(), Some(&Endpoint::LinkCreate));
    }

    #[test]
    fn test_empty_credentials_never_reach_server() {
        let backend = MockBackend::default();
        let mut account = EInvoiceAccount::default();
        let err = account.submit_credentials(&backend, &creds("  ")).unwrap_err();
        assert!(matches!(err, ReceiptsError::Validation(_)));
        let blank = CarrierCredentials {
            username: "/ABC".to_string(),
            password: Zeroizing::new(String::new()),
        };
        assert!(account.submit_credentials(&backend, &blank).is_err());
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_unlink_without_confirmation_makes_no_call() {
        let backend = MockBackend::linked("/ABC");
        let mut account = EInvoiceAccount::fetch(&backend).unwrap();
        let before = backend.calls().len();
        let outcome = account.unlink(&backend, || false).unwrap();
        assert_eq!(outcome, UnlinkOutcome::Cancelled);
        assert_eq!(backend.calls().len(), before);
        assert!(account.is_linked());
    }

    #[test]
    fn test_unlink_confirmed_requeries_status() {
        let backend = MockBackend::linked("/ABC");
        let mut account = EInvoiceAccount::fetch(&backend).unwrap();
        let outcome = account.unlink(&backend, || true).unwrap();
        assert_eq!(outcome, UnlinkOutcome::Unlinked);
        assert_eq!(account.state(), &LinkageState::Unlinked);
        assert_eq!(
            backend.calls(),
            vec![Endpoint::EInvoiceStatus, Endpoint::LinkDelete, Endpoint::EInvoiceStatus]
        );
    }

    #[test]
    fn test_unlink_when_unlinked_is_refused() {
        let backend = MockBackend::default();
        let mut account = EInvoiceAccount::fetch(&backend).unwrap();
        let mut asked = false;
        assert!(account.unlink(&backend, || {
            asked = true;
            true
        })
        .is_err());
        assert!(!asked);
        assert!(!backend.calls().contains(&Endpoint::LinkDelete));
    }

    #[test]
    fn test_rejected_unlink_keeps_linked() {
        let backend = MockBackend::linked("/ABC");
        let mut account = EInvoiceAccount::fetch(&backend).unwrap();
        backend.reject_mutations.set(true);
        assert!(account.unlink(&backend, || true).is_err());
        assert!(account.is_linked());
    }

    #[test]
    fn test_failed_refresh_keeps_previous_state() {
        let backend = MockBackend::linked("/ABC");
        let mut account = EInvoiceAccount::fetch(&backend).unwrap();
        backend.fail_status.set(true);
        assert!(account.refresh(&backend).is_err());
        assert_eq!(username(&account), Some("/ABC"));
    }

    #[test]
    fn test_submit_succeeds_when_refresh_fails() {
        let backend = MockBackend::default();
        let mut account = EInvoiceAccount::fetch(&backend).unwrap();
        backend.fail_status.set(true);
        let action = account.submit_credentials(&backend, &creds("/NEW")).unwrap();
        assert_eq!(action, LinkAction::Create);
        assert_eq!(account.state(), &LinkageState::Unlinked);
        assert_eq!(
            backend.calls(),
            vec![Endpoint::EInvoiceStatus, Endpoint::LinkCreate, Endpoint::EInvoiceStatus]
        );
    }

    #[test]
    fn test_unlink_succeeds_when_refresh_fails() {
        let backend = MockBackend::linked("/ABC");
        let mut account = EInvoiceAccount::fetch(&backend).unwrap();
        backend.fail_status.set(true);
        let outcome = account.unlink(&backend, || true).unwrap();
        assert_eq!(outcome, UnlinkOutcome::Unlinked);
        assert_eq!(username(&account), Some("/ABC"));
        assert!(backend.calls().contains(&Endpoint::LinkDelete));
    }
}
