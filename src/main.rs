fn main() {
    rating_pipeline::cli::run();
}
