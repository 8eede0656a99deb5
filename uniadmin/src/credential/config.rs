use std::sync::LazyLock;

/// Argon2 memory cost in KiB.
pub(super) static ARGON2_MEMORY_KIB: LazyLock<u32> = LazyLock::new(|| {
    std::env::var("ARGON2_MEMORY_KIB")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(19456)
});

pub(super) static ARGON2_ITERATIONS: LazyLock<u32> = LazyLock::new(|| {
    std::env::var("ARGON2_ITERATIONS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(2)
});

pub(super) static ARGON2_PARALLELISM: LazyLock<u32> = LazyLock::new(|| {
    std::env::var("ARGON2_PARALLELISM")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1)
});
