pub use self::writer::{write_manifests, ManifestFiles};

mod writer;
