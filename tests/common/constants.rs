//! Shared constants for end-to-end tests
//!
//! When test data changes, update only this file.
#![allow(dead_code)]

// ============================================================================
// Server Lifecycle
// ============================================================================

/// Maximum time to wait for a test server to answer on "/"
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Delay between readiness probes
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;

/// Timeout applied to every request of the test client
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Seed used by every test server's random source
pub const TEST_RNG_SEED: u64 = 1234;

/// Origin allowed by the test server's CORS layer
pub const TEST_ORIGIN: &str = "http://localhost:3000";

// ============================================================================
// Mood Fixtures
// ============================================================================

pub const ROMANTIC_DESCRIPTION: &str = "I want a romantic candlelit dinner";

pub const ROMANTIC_KEYWORDS: [&str; 3] = ["romantic", "candlelit", "dinner"];

pub const ROMANTIC_INSPIRATION: &str =
    "The dance of love and passion, in harmony with your heart's rhythm";

/// The seven example prompt categories
pub const EXAMPLE_CATEGORIES: [&str; 7] = [
    "romantic",
    "peaceful",
    "energetic",
    "nature",
    "urban",
    "vintage",
    "modern",
];

/// Seeds of the nature placeholder pool
pub const NATURE_SEEDS: [u32; 5] = [100, 200, 300, 400, 500];

/// Model name served by the fake diffusion service
pub const FAKE_DIFFUSION_MODEL: &str = "fake-sd-1.5";

/// Model name served by the fake Ollama service
pub const FAKE_OLLAMA_MODEL: &str = "fake-llm";
