pub use email_site_core::{contract, error, events, keys, render};
