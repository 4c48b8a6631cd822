fn main() -> std::process::ExitCode {
    tempo_scale_lib::run()
}
