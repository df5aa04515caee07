//! Address lookup through a geocoding search service.
//!
//! # Supported Providers
//!
//! - **Geoapify** - HTTP search API (requires `GEOAPIFY_API_KEY`)
//! - **Mock** - scripted responses, no network
//!
//! # Example
//!
//! ```no_run
//! use edusheet::{GeoapifyProvider, Geocoder};
//!
//! let geocoder = GeoapifyProvider::from_env().unwrap();
//! let address = geocoder.first_suggestion("ETH Zurich, Switzerland").unwrap();
//! println!("{:?}", address);
//! ```

mod geoapify;
mod mock;
mod provider;

pub use geoapify::GeoapifyProvider;
pub use mock::MockGeocoder;
pub use provider::{API_KEY_ENV, DEFAULT_ENDPOINT, Geocoder, GeocoderConfig, first_formatted};
