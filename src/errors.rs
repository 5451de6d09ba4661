//! Crate-wide error types.
//!
//! Three broad error families map onto the failure modes described for the
//! dynamical core: configuration errors (caught at start-up, before any
//! field is allocated), numerical breakdown (CFL violation surfacing as a
//! non-finite or non-physical value somewhere in the prognostic state), and
//! I/O failure (missing restart/topography file, write failure). Physics
//! column saturation artifacts are *not* represented here: they are handled
//! locally by clamping and never bubble up.

error_chain! {
    foreign_links {
        Io(::std::io::Error);
        Toml(::toml::de::Error);
        Bincode(::bincode::Error);
    }

    errors {
        /// Raised by `Settings::validate` before any field is allocated.
        Config(msg: String) {
            description("invalid configuration")
            display("invalid configuration: {}", msg)
        }

        /// Raised by the post-step sanity scan when a prognostic field
        /// contains a non-finite value or violates its invariant (e.g.
        /// `COLP <= 0`).
        NumericalBreakdown(field: String, i: usize, j: usize, k: usize, value: String) {
            description("numerical breakdown")
            display(
                "numerical breakdown in {} at (i={}, j={}, k={}): value = {}",
                field, i, j, k, value
            )
        }

        /// Grid descriptor of a restart file does not match the running
        /// configuration.
        RestartMismatch(msg: String) {
            description("restart mismatch")
            display("restart mismatch: {}", msg)
        }
    }
}
