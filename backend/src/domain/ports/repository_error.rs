//! Error shared by the hangout storage ports.

use super::define_port_error;

define_port_error! {
    /// Errors raised by hangout, poll, and recommendation repository adapters.
    pub enum RepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "repository query failed: {message}",
    }
}
