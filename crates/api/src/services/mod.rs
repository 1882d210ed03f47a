//! Business logic above the repositories.
//!
//! Services compose repository primitives into the operations handlers
//! expose: credential handling and token minting, stock-checked cart
//! mutations, the checkout orchestration, and outbound HTTP to the payment
//! gateway and mail provider.

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod email;
pub mod payments;

pub use auth::AuthService;
pub use cart::CartService;
pub use checkout::CheckoutService;
pub use email::Mailer;
pub use payments::{HostedCheckoutGateway, PaymentGateway};
