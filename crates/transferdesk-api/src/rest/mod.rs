// Supabase REST surface: PostgREST tables under `/rest/v1/{table}` and
// stored procedures under `/rest/v1/rpc/{function}`.
//
// `client` holds the transport mechanics; the endpoint modules add typed
// inherent methods on `RestClient`, one file per backend resource.

pub mod availability;
pub mod client;
pub mod models;
pub mod packages;
pub mod query;
