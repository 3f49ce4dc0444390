fn main() {
    #[cfg(feature = "app-shell")]
    tauri_build::build();
}
