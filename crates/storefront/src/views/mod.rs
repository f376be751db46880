//! HTML fragments for the host to display.
//!
//! Each fragment is an askama template over a view model holding
//! preformatted strings, so templates stay free of formatting logic.

mod cart;
mod catalog;
mod notify;
mod payment;
mod session;

pub use cart::{
    CartCountTemplate, CartItemView, CartItemsTemplate, OrderSummaryTemplate, OrderTotalsView,
};
pub use catalog::{
    CategoryItemView, CategoryListTemplate, PageLink, PaginationTemplate, ProductCardView,
    ProductGridTemplate, card_description,
};
pub use notify::{BannerTemplate, ToastTemplate};
pub use payment::{FormField, PaymentFormTemplate};
pub use session::UserMenuTemplate;

pub use askama::Template;
