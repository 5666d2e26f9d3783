fn main() {
    avatar_client::run_client_app();
}
