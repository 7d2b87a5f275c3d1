use crate::shell::Screen;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    AddMount,
    ViewMounts,
    ManageUsers,
    ChangeHostname,
}

impl Action {
    /// Screen to open for the navigation entries. Changing the hostname is
    /// handled in place by the applier, not by opening a screen.
    pub fn screen(&self) -> Option<Screen> {
        match self {
            Self::AddMount => Some(Screen::MountEdit),
            Self::ViewMounts => Some(Screen::MountView),
            Self::ManageUsers => Some(Screen::UserManager),
            Self::ChangeHostname => None,
        }
    }
}

/// One row of the MountManager screen list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub action: Action,
    pub title: &'static str,
    pub description: &'static str,
}

/// The fixed menu. The hostname entry is offered only when the hostname
/// file exists on this box.
pub fn entries(hostname_available: bool) -> Vec<Entry> {
    let mut list = vec![
        Entry {
            action: Action::AddMount,
            title: "Add new network mount point",
            description: "Add a new NFS or CIFS mount point to your box.",
        },
        Entry {
            action: Action::ViewMounts,
            title: "Mountpoints management",
            description: "View, edit or delete mountpoints on your box.",
        },
        Entry {
            action: Action::ManageUsers,
            title: "User management",
            description:
                "View, edit or delete usernames and passwords for your network.",
        },
    ];
    if hostname_available {
        list.push(Entry {
            action: Action::ChangeHostname,
            title: "Change hostname",
            description: "Change the hostname of your box.",
        });
    }
    list
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hostname_entry_is_gated() {
        let without = entries(false);
        assert_eq!(without.len(), 3);
        assert!(without
            .iter()
            .all(|entry| entry.action != Action::ChangeHostname));

        let with = entries(true);
        assert_eq!(with.len(), 4);
        assert_eq!(with.last().unwrap().action, Action::ChangeHostname);
    }

    #[test]
    fn navigation_entries_map_to_screens() {
        assert_eq!(Action::AddMount.screen(), Some(Screen::MountEdit));
        assert_eq!(Action::ViewMounts.screen(), Some(Screen::MountView));
        assert_eq!(Action::ManageUsers.screen(), Some(Screen::UserManager));
        assert_eq!(Action::ChangeHostname.screen(), None);
    }
}
