fn main() {
    rgbd_sync::cli::run();
}
