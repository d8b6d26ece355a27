//! Checkout preview/confirm flow.
//!
//! The only stateful piece of the client. A checkout is a two-step
//! protocol: stage a server-computed preview of the order (total, line
//! items, rendered receipt), show it to the user, then either commit it or
//! throw it away.
//!
//! # States
//!
//! ```text
//! Idle -> Previewing -> PreviewReady -> Confirming -> Idle        (success)
//!                            ^              |
//!                            +--------------+                     (error)
//! PreviewReady -> Idle                                            (cancel)
//! ```
//!
//! At most one [`PendingPreview`] is alive at a time: a single optional
//! slot, overwritten by each successful preview. The flow owns the slot
//! exclusively; the user surface only sees copies through
//! [`CheckoutEvent::PreviewReady`].
//!
//! Confirm commits the address captured when the preview was staged, not
//! whatever the user may have typed since. Validation failures never reach
//! the network; transport failures on preview drop back to [`CheckoutState::Idle`],
//! while transport failures on confirm keep the preview so the user can
//! retry or cancel. Nothing here is fatal to the session.

use tracing::instrument;

use tienda_core::{OrderId, Price};

use crate::api::types::{OrderConfirmation, OrderPreview, PreviewItem};
use crate::api::{ApiClient, ApiError};
use crate::cart::Cart;
use crate::session::{AuthToken, Session};

/// Severity tier of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// Events the flow reports to the presentation adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutEvent {
    /// A preview was staged and should be rendered for review.
    PreviewReady(PendingPreview),
    /// An order was durably created; the document should be offered as a
    /// download.
    Confirmed {
        order_id: OrderId,
        document: Vec<u8>,
    },
    /// A human-readable notification.
    Notice {
        severity: Severity,
        message: String,
    },
}

/// Receives [`CheckoutEvent`]s; implemented by the user surface.
pub trait EventSink {
    fn emit(&self, event: CheckoutEvent);
}

/// The network seam of the flow: the two order endpoints it drives.
///
/// [`ApiClient`] implements this for real use; tests script it.
pub trait OrdersGateway {
    /// Stage an order preview for the given address.
    async fn preview_order(
        &self,
        token: &AuthToken,
        address: &str,
    ) -> Result<OrderPreview, ApiError>;

    /// Commit an order for the given address.
    async fn confirm_order(
        &self,
        token: &AuthToken,
        address: &str,
    ) -> Result<OrderConfirmation, ApiError>;
}

impl OrdersGateway for ApiClient {
    async fn preview_order(
        &self,
        token: &AuthToken,
        address: &str,
    ) -> Result<OrderPreview, ApiError> {
        Self::preview_order(self, token, address).await
    }

    async fn confirm_order(
        &self,
        token: &AuthToken,
        address: &str,
    ) -> Result<OrderConfirmation, ApiError> {
        Self::confirm_order(self, token, address).await
    }
}

/// The single in-memory record of the most recent uncommitted preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPreview {
    /// Shipping address captured when the preview was staged; confirm sends
    /// exactly this value.
    pub address: String,
    /// Server-computed order total.
    pub total: Price,
    /// Server-computed order lines.
    pub line_items: Vec<PreviewItem>,
    /// Rendered receipt document.
    pub document: Vec<u8>,
}

/// Where the flow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutState {
    #[default]
    Idle,
    Previewing,
    PreviewReady,
    Confirming,
}

/// Orchestrates preview -> review -> confirm/cancel.
pub struct CheckoutFlow<G, S> {
    gateway: G,
    sink: S,
    state: CheckoutState,
    pending: Option<PendingPreview>,
}

impl<G: OrdersGateway, S: EventSink> CheckoutFlow<G, S> {
    /// Create an idle flow.
    pub const fn new(gateway: G, sink: S) -> Self {
        Self {
            gateway,
            sink,
            state: CheckoutState::Idle,
            pending: None,
        }
    }

    /// Current flow state.
    #[must_use]
    pub const fn state(&self) -> CheckoutState {
        self.state
    }

    /// The staged preview, if one is alive.
    #[must_use]
    pub const fn pending_preview(&self) -> Option<&PendingPreview> {
        self.pending.as_ref()
    }

    /// Stage an order preview.
    ///
    /// Preconditions checked before any network call: authenticated session,
    /// non-empty cart, non-empty shipping address (an empty `address_input`
    /// falls back to the profile's saved address). A precondition failure is
    /// reported through the sink and changes nothing.
    ///
    /// On success the previous preview, if any, is overwritten - only the
    /// latest preview is ever active. On failure no preview is retained and
    /// the flow returns to idle.
    ///
    /// Returns `true` when a preview was staged.
    #[instrument(skip_all)]
    pub async fn request_preview(
        &mut self,
        session: &Session,
        cart: &Cart,
        address_input: Option<&str>,
    ) -> bool {
        let Some(token) = session.token() else {
            self.notice(Severity::Info, "Sign in to check out");
            return false;
        };

        if cart.is_empty() {
            self.notice(Severity::Info, "Your cart is empty");
            return false;
        }

        let address = match address_input.filter(|a| !a.trim().is_empty()) {
            Some(input) => input.to_owned(),
            None => match session.profile_address() {
                Some(saved) => saved.to_owned(),
                None => {
                    self.notice(Severity::Error, "Enter a shipping address");
                    return false;
                }
            },
        };

        self.state = CheckoutState::Previewing;

        match self.gateway.preview_order(token, &address).await {
            Ok(preview) => {
                let pending = PendingPreview {
                    address,
                    total: preview.total,
                    line_items: preview.items,
                    document: preview.document,
                };
                self.pending = Some(pending.clone());
                self.state = CheckoutState::PreviewReady;
                self.sink.emit(CheckoutEvent::PreviewReady(pending));
                true
            }
            Err(e) => {
                self.pending = None;
                self.state = CheckoutState::Idle;
                self.notice(Severity::Error, &format!("Could not preview the order: {e}"));
                false
            }
        }
    }

    /// Discard the staged preview, if any, and return to idle.
    ///
    /// Idempotent; makes no network call.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.state = CheckoutState::Idle;
    }

    /// Commit the staged preview.
    ///
    /// With no preview alive this is a warning no-op, not an error, and
    /// makes no network call. The commit request carries the address
    /// captured at preview time.
    ///
    /// On success the preview is cleared and the order id returned; the
    /// caller should refresh cart, order history, and product views. On
    /// failure the preview stays intact so the user can retry or cancel.
    #[instrument(skip_all)]
    pub async fn confirm(&mut self, session: &Session) -> Option<OrderId> {
        let Some(address) = self.pending.as_ref().map(|p| p.address.clone()) else {
            self.notice(Severity::Warning, "No active checkout preview");
            return None;
        };

        let Some(token) = session.token() else {
            self.notice(Severity::Error, "Sign in to check out");
            return None;
        };

        self.state = CheckoutState::Confirming;

        match self.gateway.confirm_order(token, &address).await {
            Ok(confirmation) => {
                let order_id = confirmation.order_id;
                self.pending = None;
                self.state = CheckoutState::Idle;
                self.sink.emit(CheckoutEvent::Confirmed {
                    order_id,
                    document: confirmation.document,
                });
                self.notice(Severity::Success, &format!("Order {order_id} placed"));
                Some(order_id)
            }
            Err(e) => {
                // Preview stays alive; the user can retry or cancel.
                self.state = CheckoutState::PreviewReady;
                self.notice(Severity::Error, &format!("Could not confirm the order: {e}"));
                None
            }
        }
    }

    fn notice(&self, severity: Severity, message: &str) {
        self.sink.emit(CheckoutEvent::Notice {
            severity,
            message: message.to_owned(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::rc::Rc;

    use tienda_core::{ProductId, Quantity};

    use crate::api::types::{CartItem, UserProfile};

    // ─────────────────────────────────────────────────────────────────────
    // Scripted gateway and recording sink
    // ─────────────────────────────────────────────────────────────────────

    #[derive(Default)]
    struct FakeGateway {
        preview_responses: RefCell<VecDeque<Result<OrderPreview, ApiError>>>,
        confirm_responses: RefCell<VecDeque<Result<OrderConfirmation, ApiError>>>,
        preview_calls: Cell<usize>,
        confirm_calls: Cell<usize>,
        preview_addresses: RefCell<Vec<String>>,
        confirm_addresses: RefCell<Vec<String>>,
    }

    impl OrdersGateway for Rc<FakeGateway> {
        async fn preview_order(
            &self,
            _token: &AuthToken,
            address: &str,
        ) -> Result<OrderPreview, ApiError> {
            self.preview_calls.set(self.preview_calls.get() + 1);
            self.preview_addresses.borrow_mut().push(address.to_owned());
            self.preview_responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| panic!("unexpected preview call"))
        }

        async fn confirm_order(
            &self,
            _token: &AuthToken,
            address: &str,
        ) -> Result<OrderConfirmation, ApiError> {
            self.confirm_calls.set(self.confirm_calls.get() + 1);
            self.confirm_addresses.borrow_mut().push(address.to_owned());
            self.confirm_responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| panic!("unexpected confirm call"))
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSink(Rc<RefCell<Vec<CheckoutEvent>>>);

    impl EventSink for RecordingSink {
        fn emit(&self, event: CheckoutEvent) {
            self.0.borrow_mut().push(event);
        }
    }

    impl RecordingSink {
        fn events(&self) -> Vec<CheckoutEvent> {
            self.0.borrow().clone()
        }

        fn notices(&self) -> Vec<(Severity, String)> {
            self.events()
                .into_iter()
                .filter_map(|e| match e {
                    CheckoutEvent::Notice { severity, message } => Some((severity, message)),
                    _ => None,
                })
                .collect()
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Fixtures
    // ─────────────────────────────────────────────────────────────────────

    fn flow() -> (
        CheckoutFlow<Rc<FakeGateway>, RecordingSink>,
        Rc<FakeGateway>,
        RecordingSink,
    ) {
        let gateway = Rc::new(FakeGateway::default());
        let sink = RecordingSink::default();
        let flow = CheckoutFlow::new(Rc::clone(&gateway), sink.clone());
        (flow, gateway, sink)
    }

    fn session_with_profile_address() -> Session {
        let user = UserProfile {
            id: None,
            name: "Ana".to_owned(),
            email: Some("ana@example.com".to_owned()),
            address: Some("Saved 456".to_owned()),
        };
        Session::authenticated(AuthToken::new("tok".to_owned()), user)
    }

    fn session_without_address() -> Session {
        let user = UserProfile {
            id: None,
            name: "Ana".to_owned(),
            email: None,
            address: None,
        };
        Session::authenticated(AuthToken::new("tok".to_owned()), user)
    }

    fn cart_with_widget() -> Cart {
        Cart::from(vec![CartItem {
            product_id: ProductId::new(7),
            name: "Widget".to_owned(),
            unit_price: Price::from_pesos(9990),
            quantity: Quantity::new(2).unwrap(),
            image_url: None,
        }])
    }

    fn widget_preview() -> OrderPreview {
        OrderPreview {
            total: Price::from_pesos(19980),
            items: vec![PreviewItem {
                name: "Widget".to_owned(),
                quantity: Quantity::new(2).unwrap(),
                unit_price: Price::from_pesos(9990),
            }],
            document: b"%PDF-preview".to_vec(),
        }
    }

    fn order_55() -> OrderConfirmation {
        OrderConfirmation {
            order_id: OrderId::new(55),
            document: b"%PDF-final".to_vec(),
        }
    }

    fn status(status: u16, message: &str) -> ApiError {
        ApiError::Status {
            status,
            message: message.to_owned(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Preview
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn empty_cart_makes_no_network_call() {
        let (mut flow, gateway, sink) = flow();
        let session = session_with_profile_address();

        let staged = flow
            .request_preview(&session, &Cart::empty(), Some("Main 123"))
            .await;

        assert!(!staged);
        assert_eq!(gateway.preview_calls.get(), 0);
        assert!(flow.pending_preview().is_none());
        assert_eq!(flow.state(), CheckoutState::Idle);
        assert_eq!(
            sink.notices(),
            vec![(Severity::Info, "Your cart is empty".to_owned())]
        );
    }

    #[tokio::test]
    async fn anonymous_session_is_blocked_before_network() {
        let (mut flow, gateway, sink) = flow();

        let staged = flow
            .request_preview(&Session::anonymous(), &cart_with_widget(), Some("Main 123"))
            .await;

        assert!(!staged);
        assert_eq!(gateway.preview_calls.get(), 0);
        assert_eq!(
            sink.notices(),
            vec![(Severity::Info, "Sign in to check out".to_owned())]
        );
    }

    #[tokio::test]
    async fn missing_address_with_no_saved_fallback_is_an_error() {
        let (mut flow, gateway, sink) = flow();
        let session = session_without_address();

        let staged = flow
            .request_preview(&session, &cart_with_widget(), None)
            .await;

        assert!(!staged);
        assert_eq!(gateway.preview_calls.get(), 0);
        assert_eq!(
            sink.notices(),
            vec![(Severity::Error, "Enter a shipping address".to_owned())]
        );
    }

    #[tokio::test]
    async fn empty_address_falls_back_to_profile_address() {
        let (mut flow, gateway, _sink) = flow();
        let session = session_with_profile_address();
        gateway
            .preview_responses
            .borrow_mut()
            .push_back(Ok(widget_preview()));

        let staged = flow
            .request_preview(&session, &cart_with_widget(), Some("   "))
            .await;

        assert!(staged);
        assert_eq!(
            gateway.preview_addresses.borrow().as_slice(),
            ["Saved 456".to_owned()]
        );
    }

    #[tokio::test]
    async fn successful_preview_stages_exactly_what_the_response_carried() {
        let (mut flow, gateway, sink) = flow();
        let session = session_with_profile_address();
        gateway
            .preview_responses
            .borrow_mut()
            .push_back(Ok(widget_preview()));

        let staged = flow
            .request_preview(&session, &cart_with_widget(), Some("Main 123"))
            .await;

        assert!(staged);
        assert_eq!(flow.state(), CheckoutState::PreviewReady);

        let pending = flow.pending_preview().expect("preview staged");
        assert_eq!(pending.address, "Main 123");
        assert_eq!(pending.total, Price::from_pesos(19980));
        assert_eq!(pending.line_items, widget_preview().items);
        assert_eq!(pending.document, b"%PDF-preview");

        // The presentation adapter got the same data.
        assert_eq!(
            sink.events(),
            vec![CheckoutEvent::PreviewReady(pending.clone())]
        );
    }

    #[tokio::test]
    async fn preview_failure_returns_to_idle_with_no_preview() {
        let (mut flow, gateway, sink) = flow();
        let session = session_with_profile_address();
        gateway
            .preview_responses
            .borrow_mut()
            .push_back(Err(status(500, "internal error")));

        let staged = flow
            .request_preview(&session, &cart_with_widget(), Some("Main 123"))
            .await;

        assert!(!staged);
        assert_eq!(flow.state(), CheckoutState::Idle);
        assert!(flow.pending_preview().is_none());

        let notices = sink.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].0, Severity::Error);
        assert!(notices[0].1.contains("status 500"));
    }

    #[tokio::test]
    async fn second_preview_overwrites_the_first() {
        let (mut flow, gateway, _sink) = flow();
        let session = session_with_profile_address();

        let mut second = widget_preview();
        second.total = Price::from_pesos(29970);
        gateway
            .preview_responses
            .borrow_mut()
            .extend([Ok(widget_preview()), Ok(second)]);

        flow.request_preview(&session, &cart_with_widget(), Some("Main 123"))
            .await;
        flow.request_preview(&session, &cart_with_widget(), Some("Other 9"))
            .await;

        let pending = flow.pending_preview().expect("preview staged");
        assert_eq!(pending.total, Price::from_pesos(29970));
        assert_eq!(pending.address, "Other 9");
    }

    // ─────────────────────────────────────────────────────────────────────
    // Cancel
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn cancel_clears_the_slot_and_is_idempotent() {
        let (mut flow, gateway, _sink) = flow();
        let session = session_with_profile_address();
        gateway
            .preview_responses
            .borrow_mut()
            .push_back(Ok(widget_preview()));

        flow.request_preview(&session, &cart_with_widget(), Some("Main 123"))
            .await;
        assert!(flow.pending_preview().is_some());

        flow.cancel();
        assert_eq!(flow.state(), CheckoutState::Idle);
        assert!(flow.pending_preview().is_none());

        // Second cancel has the same effect as the first.
        flow.cancel();
        assert_eq!(flow.state(), CheckoutState::Idle);
        assert!(flow.pending_preview().is_none());
    }

    #[test]
    fn cancel_from_idle_is_a_noop() {
        let (mut flow, _gateway, sink) = flow();
        flow.cancel();
        assert_eq!(flow.state(), CheckoutState::Idle);
        assert!(sink.events().is_empty());
    }

    // ─────────────────────────────────────────────────────────────────────
    // Confirm
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn confirm_without_preview_is_a_warning_noop() {
        let (mut flow, gateway, sink) = flow();
        let session = session_with_profile_address();

        let order = flow.confirm(&session).await;

        assert_eq!(order, None);
        assert_eq!(gateway.confirm_calls.get(), 0);
        assert_eq!(flow.state(), CheckoutState::Idle);
        assert_eq!(
            sink.notices(),
            vec![(Severity::Warning, "No active checkout preview".to_owned())]
        );
    }

    #[tokio::test]
    async fn confirm_uses_the_address_captured_at_preview_time() {
        let (mut flow, gateway, _sink) = flow();
        // Profile says "Saved 456" but the preview was staged for "Main 123";
        // confirm must send the captured value.
        let session = session_with_profile_address();
        gateway
            .preview_responses
            .borrow_mut()
            .push_back(Ok(widget_preview()));
        gateway.confirm_responses.borrow_mut().push_back(Ok(order_55()));

        flow.request_preview(&session, &cart_with_widget(), Some("Main 123"))
            .await;
        flow.confirm(&session).await;

        assert_eq!(
            gateway.confirm_addresses.borrow().as_slice(),
            ["Main 123".to_owned()]
        );
    }

    #[tokio::test]
    async fn confirm_success_clears_preview_and_reports_order() {
        let (mut flow, gateway, sink) = flow();
        let session = session_with_profile_address();
        gateway
            .preview_responses
            .borrow_mut()
            .push_back(Ok(widget_preview()));
        gateway.confirm_responses.borrow_mut().push_back(Ok(order_55()));

        flow.request_preview(&session, &cart_with_widget(), Some("Main 123"))
            .await;
        let order = flow.confirm(&session).await;

        assert_eq!(order, Some(OrderId::new(55)));
        assert_eq!(flow.state(), CheckoutState::Idle);
        assert!(flow.pending_preview().is_none());

        // The confirmed event carries the final document for download.
        assert!(sink.events().contains(&CheckoutEvent::Confirmed {
            order_id: OrderId::new(55),
            document: b"%PDF-final".to_vec(),
        }));
    }

    #[tokio::test]
    async fn confirm_failure_keeps_preview_for_retry() {
        let (mut flow, gateway, sink) = flow();
        let session = session_with_profile_address();
        gateway
            .preview_responses
            .borrow_mut()
            .push_back(Ok(widget_preview()));
        gateway
            .confirm_responses
            .borrow_mut()
            .extend([Err(status(409, "Stock insuficiente")), Ok(order_55())]);

        flow.request_preview(&session, &cart_with_widget(), Some("Main 123"))
            .await;

        let first = flow.confirm(&session).await;
        assert_eq!(first, None);
        assert_eq!(flow.state(), CheckoutState::PreviewReady);
        assert!(flow.pending_preview().is_some());
        assert!(
            sink.notices()
                .iter()
                .any(|(s, m)| *s == Severity::Error && m.contains("Stock insuficiente"))
        );

        // Retry succeeds against the same captured preview.
        let second = flow.confirm(&session).await;
        assert_eq!(second, Some(OrderId::new(55)));
        assert!(flow.pending_preview().is_none());
    }

    #[tokio::test]
    async fn confirm_failure_still_allows_cancel() {
        let (mut flow, gateway, _sink) = flow();
        let session = session_with_profile_address();
        gateway
            .preview_responses
            .borrow_mut()
            .push_back(Ok(widget_preview()));
        gateway
            .confirm_responses
            .borrow_mut()
            .push_back(Err(status(409, "Stock insuficiente")));

        flow.request_preview(&session, &cart_with_widget(), Some("Main 123"))
            .await;
        flow.confirm(&session).await;

        flow.cancel();
        assert_eq!(flow.state(), CheckoutState::Idle);
        assert!(flow.pending_preview().is_none());
    }
}
