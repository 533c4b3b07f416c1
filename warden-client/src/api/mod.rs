//! Typed views over the admin API's record endpoints.

mod devices;
mod inquiries;
mod keys;
mod orders;
mod otps;
mod permissions;
mod plans;
mod roles;
mod subscriptions;
mod users;

pub use devices::{DeviceQuery, Devices};
pub use inquiries::Inquiries;
pub use keys::LicenseKeys;
pub use orders::Orders;
pub use otps::Otps;
pub use permissions::Permissions;
pub use plans::Plans;
pub use roles::Roles;
pub use subscriptions::Subscriptions;
pub use users::{UserQuery, Users};

use url::form_urlencoded;

/// `/{collection}/{id}` with the id percent-encoded.
pub(crate) fn item_path(collection: &str, id: &str) -> String {
    format!("/{}/{}", collection, urlencoding::encode(id))
}

/// Append the set, non-empty parameters as a query string.
pub(crate) fn with_query<'a>(
    path: &str,
    params: impl IntoIterator<Item = (&'a str, Option<String>)>,
) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    let mut any = false;

    for (name, value) in params {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            query.append_pair(name, &value);
            any = true;
        }
    }

    if any {
        format!("{}?{}", path, query.finish())
    } else {
        path.to_string()
    }
}

/// Page numbers and limits of zero mean "not set".
pub(crate) fn positive(value: Option<u32>) -> Option<String> {
    value.filter(|v| *v > 0).map(|v| v.to_string())
}
