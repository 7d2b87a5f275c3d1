/// Screens owned by other components of the menu system. Opaque here: this
/// component only asks the shell to open them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    MountEdit,
    MountView,
    UserManager,
}

/// The host windowing framework, reduced to what this component needs from
/// it. Skins, pixmaps and translations stay on the other side of this trait.
pub trait Shell {
    fn open(&mut self, screen: Screen);

    fn close(&mut self);

    fn show_waiting(&mut self, message: &str);

    fn hide_waiting(&mut self);

    /// Modal notice. Every user-visible success or failure report goes
    /// through here.
    fn notify(&mut self, message: &str);
}

/// Stand-in shell for running outside the set-top-box UI. Everything becomes
/// a line on stdout.
#[derive(Debug, Default)]
pub struct ConsoleShell {
    waiting: bool,
}

impl Shell for ConsoleShell {
    fn open(&mut self, screen: Screen) {
        println!("[open] {screen:?} (owned by another component)");
    }

    fn close(&mut self) {
        println!("[close]");
    }

    fn show_waiting(&mut self, message: &str) {
        self.waiting = true;
        println!("[wait] {message}");
    }

    fn hide_waiting(&mut self) {
        if self.waiting {
            self.waiting = false;
            println!("[wait] done");
        }
    }

    fn notify(&mut self, message: &str) {
        println!("[notice] {message}");
    }
}
