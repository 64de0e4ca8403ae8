fn main() {
    swipe_deck_demo::run();
}
