fn main() {
    worlds_pickem_lib::run()
}
