use crate::payload::ProductId;
use std::fmt;

/// The five requests of the marketplace journey, in the order a simulated user makes them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    BrowseCatalogue,
    ViewProductDetails,
    ReviewFavourites,
    InspectShipping,
    CheckPayments,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::BrowseCatalogue,
        Step::ViewProductDetails,
        Step::ReviewFavourites,
        Step::InspectShipping,
        Step::CheckPayments,
    ];

    /// Normalized request name used to group statistics. Built from the path template so every
    /// product id lands under the same label.
    pub fn label(&self) -> &'static str {
        match self {
            Step::BrowseCatalogue => "GET /product-service/api/products",
            Step::ViewProductDetails => "GET /product-service/api/products/{id}",
            Step::ReviewFavourites => "GET /favourite-service/api/favourites",
            Step::InspectShipping => "GET /shipping-service/api/shippings",
            Step::CheckPayments => "GET /payment-service/api/payments",
        }
    }

    pub fn path_template(&self) -> &'static str {
        // Labels are "GET " followed by the template.
        &self.label()[4..]
    }

    /// Concrete request path. `None` for the detail step when no product id is known.
    pub fn path(&self, product_id: Option<ProductId>) -> Option<String> {
        match self {
            Step::ViewProductDetails => {
                product_id.map(|id| format!("/product-service/api/products/{id}"))
            }
            _ => Some(self.path_template().to_string()),
        }
    }

    /// Fields the first item of a collection response must carry.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Step::ReviewFavourites => &["user", "product"],
            Step::InspectShipping => &["order", "product"],
            Step::CheckPayments => &["paymentStatus", "order"],
            Step::BrowseCatalogue | Step::ViewProductDetails => &[],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Step::BrowseCatalogue => "browse_product_catalogue",
            Step::ViewProductDetails => "view_product_details",
            Step::ReviewFavourites => "review_favourites",
            Step::InspectShipping => "inspect_shipping_summary",
            Step::CheckPayments => "check_payment_status",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
