//! Checkout page state machine.
//!
//! ```text
//! Shipping --proceed_to_payment--> Payment --process_payment--> Completed
//!    ^                                |
//!    +---------back_to_shipping-------+
//! ```
//!
//! A failed order or payment leaves the flow in `Payment` so the user can
//! retry. Order creation always completes before payment starts.

mod payment;
mod shipping;

pub use payment::{PaymentOutcome, PaymentRedirect};
pub use shipping::{SHIPPING_REQUIRED, validate as validate_shipping};

use std::time::Duration;

use askama::Template;
use chrono::Utc;
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use bazaar_core::{OrderId, PaymentMethod};

use crate::api::{ApiClient, ApiError, response};
use crate::error::{ClientError, Result, ValidationError, add_breadcrumb};
use crate::models::{
    CartItem, CheckoutSummary, OrderConfirmation, OrderTotals, PayHereInitiation, ShippingDetails,
};
use crate::navigation::{Navigation, Page};
use crate::services::notify::Notifier;
use crate::views::OrderSummaryTemplate;

/// Delay before leaving for the order confirmation page.
pub const SUCCESS_REDIRECT_DELAY: Duration = Duration::from_secs(2);

/// Shown after a cash-on-delivery order is placed.
const COD_PLACED: &str = "Order placed successfully! You will pay when delivered.";

const PAYHERE_FAILED: &str = "Failed to initiate PayHere payment";

const SHIPPING_FIRST: &str = "Please complete your shipping details first";
const ALREADY_PLACED: &str = "This order has already been placed";

/// Steps of the checkout page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CheckoutStep {
    /// Shipping address form.
    #[default]
    Shipping,
    /// Payment method selection.
    Payment,
    /// Order placed; gateway redirect or confirmation follows.
    Completed,
}

impl CheckoutStep {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Shipping => "shipping",
            Self::Payment => "payment",
            Self::Completed => "completed",
        }
    }

    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Shipping => "Shipping",
            Self::Payment => "Payment",
            Self::Completed => "Completed",
        }
    }

    /// Step number shown in the progress indicator (1-indexed).
    #[must_use]
    pub const fn number(&self) -> u8 {
        match self {
            Self::Shipping => 1,
            Self::Payment => 2,
            Self::Completed => 3,
        }
    }
}

/// State of the checkout page.
pub struct CheckoutFlow {
    api: ApiClient,
    notifier: Notifier,
    step: CheckoutStep,
    form: ShippingDetails,
    form_invalid: bool,
    snapshot: Option<ShippingDetails>,
    method: Option<PaymentMethod>,
    items: Vec<CartItem>,
    totals: OrderTotals,
    order_id: Option<OrderId>,
}

impl std::fmt::Debug for CheckoutFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutFlow")
            .field("step", &self.step)
            .field("method", &self.method)
            .field("items", &self.items.len())
            .field("order_id", &self.order_id)
            .finish_non_exhaustive()
    }
}

impl CheckoutFlow {
    #[must_use]
    pub fn new(api: ApiClient, notifier: Notifier) -> Self {
        Self {
            api,
            notifier,
            step: CheckoutStep::Shipping,
            form: ShippingDetails::default(),
            form_invalid: false,
            snapshot: None,
            method: None,
            items: Vec::new(),
            totals: OrderTotals::EMPTY,
            order_id: None,
        }
    }

    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    /// Current shipping inputs.
    #[must_use]
    pub const fn shipping_form(&self) -> &ShippingDetails {
        &self.form
    }

    /// Shipping inputs, for the host to fill in.
    pub fn shipping_form_mut(&mut self) -> &mut ShippingDetails {
        &mut self.form
    }

    /// Replace every shipping input at once.
    pub fn set_shipping(&mut self, details: ShippingDetails) {
        self.form = details;
    }

    /// Whether the last validation of the shipping form failed.
    #[must_use]
    pub const fn form_invalid(&self) -> bool {
        self.form_invalid
    }

    /// Shipping details captured when moving to the payment step.
    #[must_use]
    pub const fn shipping_snapshot(&self) -> Option<&ShippingDetails> {
        self.snapshot.as_ref()
    }

    #[must_use]
    pub const fn payment_method(&self) -> Option<PaymentMethod> {
        self.method
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub const fn totals(&self) -> &OrderTotals {
        &self.totals
    }

    /// Order created by the last payment attempt, if any.
    #[must_use]
    pub const fn order_id(&self) -> Option<OrderId> {
        self.order_id
    }

    // =========================================================================
    // Summary
    // =========================================================================

    /// Fetch the items and totals to check out.
    ///
    /// On any failure the summary switches to the empty cart and an error
    /// notification is shown.
    ///
    /// # Errors
    ///
    /// Returns the API error, or `InvalidResponse` when `items` is missing
    /// or not an array.
    #[instrument(skip(self))]
    pub async fn load_checkout_summary(&mut self) -> Result<()> {
        let loaded = self
            .api
            .get_json::<Value>("checkout/summary", &[])
            .await
            .and_then(|value| {
                CheckoutSummary::from_json(&value).ok_or_else(|| {
                    ApiError::InvalidResponse("Invalid cart data structure".to_string())
                })
            });

        match loaded {
            Ok(summary) => {
                info!(items = summary.items.len(), "Checkout summary loaded");
                self.items = summary.items;
                self.totals = summary.totals;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to load checkout summary");
                self.items.clear();
                self.totals = OrderTotals::EMPTY;
                let err = ClientError::from(e);
                self.notifier
                    .error(format!("Failed to load cart items: {}", err.user_message()));
                Err(err)
            }
        }
    }

    /// Render the item rows (or empty cart) and the four totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render_order_summary(&self) -> askama::Result<String> {
        OrderSummaryTemplate::new(&self.items, &self.totals).render()
    }

    // =========================================================================
    // Steps
    // =========================================================================

    /// Validate the shipping form and move to the payment step.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` listing the offending fields; the
    /// flow stays on the shipping step.
    pub fn proceed_to_payment(&mut self) -> Result<()> {
        if let Err(e) = self.check_shipping() {
            self.notifier.error(SHIPPING_REQUIRED);
            return Err(e.into());
        }

        self.snapshot = Some(self.form.clone());
        self.step = CheckoutStep::Payment;
        add_breadcrumb("checkout", "Shipping completed", None);
        Ok(())
    }

    /// Return to the shipping form. Inputs are kept.
    pub fn back_to_shipping(&mut self) {
        self.step = CheckoutStep::Shipping;
    }

    pub fn select_payment_method(&mut self, method: PaymentMethod) {
        self.method = Some(method);
    }

    fn check_shipping(&mut self) -> std::result::Result<(), ValidationError> {
        let checked = shipping::validate(&self.form);
        self.form_invalid = checked.is_err();
        checked
    }

    // =========================================================================
    // Payment
    // =========================================================================

    /// Create the order and start payment with the selected method.
    ///
    /// Only runs from the payment step. Any failure shows
    /// `Payment failed: <reason>` and leaves the step unchanged.
    ///
    /// # Errors
    ///
    /// Returns the validation, order or payment error.
    #[instrument(skip(self))]
    pub async fn process_payment(&mut self) -> Result<PaymentOutcome> {
        match self.place_order().await {
            Ok(outcome) => {
                self.step = CheckoutStep::Completed;
                Ok(outcome)
            }
            Err(e) => {
                error!(error = %e, "Payment failed");
                self.notifier
                    .error(format!("Payment failed: {}", e.user_message()));
                Err(e)
            }
        }
    }

    async fn place_order(&mut self) -> Result<PaymentOutcome> {
        match self.step {
            CheckoutStep::Payment => {}
            CheckoutStep::Shipping => {
                return Err(ValidationError::new(SHIPPING_FIRST, Vec::new()).into());
            }
            CheckoutStep::Completed => {
                return Err(ValidationError::new(ALREADY_PLACED, Vec::new()).into());
            }
        }
        let method = self.method.ok_or_else(|| {
            ValidationError::new("Please select a payment method", vec!["paymentMethod"])
        })?;
        self.check_shipping()?;
        let shipping = self.form.clone();

        let order = self.create_order(&shipping, method).await?;
        self.order_id = Some(order.order_id);

        match method {
            PaymentMethod::PayHere => self
                .initiate_payhere_payment(order.order_id)
                .await
                .map(PaymentOutcome::Redirect),
            PaymentMethod::Cod => self
                .finalize_cash_on_delivery(order.order_id)
                .await
                .map(PaymentOutcome::Navigate),
        }
    }

    /// Create an order for the displayed total.
    ///
    /// # Errors
    ///
    /// Returns the backend's error, or "Failed to create order".
    #[instrument(skip(self, shipping))]
    pub async fn create_order(
        &self,
        shipping: &ShippingDetails,
        method: PaymentMethod,
    ) -> Result<OrderConfirmation> {
        let shipping_json = serde_json::to_string(shipping)
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;

        let order: OrderConfirmation = self
            .api
            .post_form_confirmed(
                "checkout/createOrder",
                &[
                    ("shippingAddress", shipping_json),
                    ("paymentMethod", method.as_str().to_string()),
                    ("totalAmount", self.totals.total.rounded().to_string()),
                ],
                "Failed to create order",
            )
            .await?;

        let order_id = order.order_id.to_string();
        add_breadcrumb(
            "checkout",
            "Order created",
            Some(&[("order_id", order_id.as_str()), ("method", method.as_str())]),
        );
        info!(order_id = %order.order_id, %method, "Order created");
        Ok(order)
    }

    /// Ask the backend for the gateway form of an order.
    ///
    /// # Errors
    ///
    /// Returns the backend's error, or "Failed to initiate PayHere payment"
    /// when the reply lacks `success` or the gateway fields.
    #[instrument(skip(self))]
    pub async fn initiate_payhere_payment(&self, order_id: OrderId) -> Result<PaymentRedirect> {
        let reply: Value = self
            .api
            .post_form_confirmed(
                "checkout/payhere/initiate",
                &[("orderId", order_id.to_string())],
                PAYHERE_FAILED,
            )
            .await?;
        if reply.get("payhereData").is_none_or(Value::is_null) {
            return Err(ApiError::server(None, PAYHERE_FAILED).into());
        }
        let init: PayHereInitiation = response::decode(reply)?;

        info!(%order_id, fields = init.payhere_data.len(), "Redirecting to PayHere");
        Ok(PaymentRedirect::post(init.payment_url, init.payhere_data))
    }

    /// Mark an order as confirmed.
    ///
    /// # Errors
    ///
    /// Returns the backend's error, or "Failed to confirm order".
    #[instrument(skip(self))]
    pub async fn confirm_order(&self, order_id: OrderId) -> Result<()> {
        self.api
            .post_form_confirmed::<Value>(
                "checkout/confirm",
                &[("orderId", order_id.to_string())],
                "Failed to confirm order",
            )
            .await?;
        info!(%order_id, "Order confirmed");
        Ok(())
    }

    async fn finalize_cash_on_delivery(&self, order_id: OrderId) -> Result<Navigation> {
        // The backend only uses this id to correlate the payment record.
        let payment_id = format!("cod_{}", Utc::now().timestamp_millis());

        self.api
            .post_form_confirmed::<Value>(
                "payment/finalize",
                &[
                    ("orderId", order_id.to_string()),
                    ("paymentMethod", PaymentMethod::Cod.as_str().to_string()),
                    ("paymentId", payment_id),
                ],
                "Failed to place COD order",
            )
            .await?;

        self.notifier.success(COD_PLACED);
        Ok(Navigation::to(format!(
            "{}?orderId={order_id}",
            Page::OrderSuccess.path()
        ))
        .after(SUCCESS_REDIRECT_DELAY))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use url::Url;

    fn flow() -> CheckoutFlow {
        let api = ApiClient::new(&Url::parse("http://127.0.0.1:9/").unwrap()).unwrap();
        CheckoutFlow::new(api, Notifier::default())
    }

    #[test]
    fn test_step_metadata() {
        assert_eq!(CheckoutStep::default(), CheckoutStep::Shipping);
        assert_eq!(CheckoutStep::Payment.number(), 2);
        assert_eq!(CheckoutStep::Completed.as_str(), "completed");
    }

    #[tokio::test]
    async fn test_invalid_shipping_stays_on_form() {
        let mut flow = flow();
        let err = flow.proceed_to_payment().unwrap_err();

        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(flow.step(), CheckoutStep::Shipping);
        assert!(flow.form_invalid());
        assert!(flow.shipping_snapshot().is_none());

        let shown = flow.notifier.active();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].message, SHIPPING_REQUIRED);
    }

    #[tokio::test]
    async fn test_valid_shipping_moves_to_payment_and_back() {
        let mut flow = flow();
        flow.set_shipping(shipping::sample());
        flow.proceed_to_payment().unwrap();

        assert_eq!(flow.step(), CheckoutStep::Payment);
        assert!(!flow.form_invalid());
        assert_eq!(flow.shipping_snapshot(), Some(&shipping::sample()));

        flow.back_to_shipping();
        assert_eq!(flow.step(), CheckoutStep::Shipping);
        assert_eq!(flow.shipping_form(), &shipping::sample());
    }

    #[tokio::test]
    async fn test_payment_requires_method() {
        let mut flow = flow();
        flow.set_shipping(shipping::sample());
        flow.proceed_to_payment().unwrap();

        let err = flow.process_payment().await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(flow.step(), CheckoutStep::Payment);

        let shown = flow.notifier.active();
        assert_eq!(
            shown.last().unwrap().message,
            "Payment failed: Please select a payment method"
        );
    }

    #[tokio::test]
    async fn test_payment_rejected_before_shipping_step_is_done() {
        let mut flow = flow();
        flow.set_shipping(shipping::sample());
        flow.select_payment_method(PaymentMethod::Cod);

        let err = flow.process_payment().await.unwrap_err();
        assert_eq!(err.user_message(), SHIPPING_FIRST);
        assert_eq!(flow.step(), CheckoutStep::Shipping);
        assert_eq!(flow.order_id(), None);
    }

    #[tokio::test]
    async fn test_payment_rejected_once_completed() {
        let mut flow = flow();
        flow.set_shipping(shipping::sample());
        flow.proceed_to_payment().unwrap();
        flow.select_payment_method(PaymentMethod::Cod);
        flow.step = CheckoutStep::Completed;

        let err = flow.process_payment().await.unwrap_err();
        assert_eq!(err.user_message(), ALREADY_PLACED);
        assert_eq!(flow.step(), CheckoutStep::Completed);
        assert_eq!(
            flow.notifier.active().last().unwrap().message,
            format!("Payment failed: {ALREADY_PLACED}")
        );
    }

    #[test]
    fn test_empty_summary_renders_zero_totals() {
        let html = flow().render_order_summary().unwrap();
        assert!(html.contains("Your cart is empty"));
        assert!(html.contains(r#"<span id="total">$0.00</span>"#));
    }
}
