//! End-to-end coverage of the plain (non-chunked) engine surface.
