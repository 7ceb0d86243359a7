/// Payment processing via Stripe Checkout
///
/// # Modules
///
/// - [`stripe`]: HTTP client for the Stripe API plus webhook signature
///   verification
/// - [`reconcile`]: the single path by which a paid checkout session becomes
///   a tryout registration row
///
/// Two ingress paths feed the reconciler: the asynchronous
/// `checkout.session.completed` webhook and the synchronous client-side
/// confirm endpoint that runs after the checkout redirect. Both converge on
/// [`reconcile::reconcile_checkout`], which is safe to call any number of
/// times for the same session.

pub mod reconcile;
pub mod stripe;
