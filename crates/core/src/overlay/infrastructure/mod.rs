pub mod snapshot_overlay;
