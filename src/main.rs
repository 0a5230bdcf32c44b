fn main() {
    laraforge::app::cli::run();
}
