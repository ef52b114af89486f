/// Top-level sections shown in the tab bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Home,
    Chat,
    Setting,
    About,
}

impl Section {
    pub fn as_str(&self) -> &str {
        match self {
            Section::Home => "Home",
            Section::Chat => "Chat",
            Section::Setting => "Setting",
            Section::About => "About",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Section::Home => "/home",
            Section::Chat => "/chat",
            Section::Setting => "/setting",
            Section::About => "/about",
        }
    }

    pub fn all() -> [Section; 4] {
        [Section::Home, Section::Chat, Section::Setting, Section::About]
    }

    /// Section owning a resolved path.
    pub fn of(path: &str) -> Option<Section> {
        Self::all().into_iter().find(|section| {
            let prefix = section.path();
            path == prefix || path.starts_with(&format!("{}/", prefix))
        })
    }

    pub fn next(self) -> Section {
        let all = Self::all();
        let index = all.iter().position(|s| *s == self).unwrap_or(0);
        all[(index + 1) % all.len()]
    }

    pub fn previous(self) -> Section {
        let all = Self::all();
        let index = all.iter().position(|s| *s == self).unwrap_or(0);
        all[(index + all.len() - 1) % all.len()]
    }
}

/// Sub-tabs of the home section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeTab {
    Ollama,
    Tags,
    Online,
}

impl HomeTab {
    pub fn as_str(&self) -> &str {
        match self {
            HomeTab::Ollama => "Ollama",
            HomeTab::Tags => "Models",
            HomeTab::Online => "Online",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            HomeTab::Ollama => "/home/ollama",
            HomeTab::Tags => "/home/tags",
            HomeTab::Online => "/home/online",
        }
    }

    pub fn all() -> [HomeTab; 3] {
        [HomeTab::Ollama, HomeTab::Tags, HomeTab::Online]
    }

    pub fn of(path: &str) -> Option<HomeTab> {
        Self::all().into_iter().find(|tab| tab.path() == path)
    }

    pub fn next(self) -> HomeTab {
        match self {
            HomeTab::Ollama => HomeTab::Tags,
            HomeTab::Tags => HomeTab::Online,
            HomeTab::Online => HomeTab::Ollama,
        }
    }

    pub fn previous(self) -> HomeTab {
        match self {
            HomeTab::Ollama => HomeTab::Online,
            HomeTab::Tags => HomeTab::Ollama,
            HomeTab::Online => HomeTab::Tags,
        }
    }
}

/// Route reached with a digit key.
pub fn shortcut(digit: char) -> Option<&'static str> {
    match digit {
        '1' => Some(HomeTab::Ollama.path()),
        '2' => Some(HomeTab::Tags.path()),
        '3' => Some(HomeTab::Online.path()),
        '4' => Some(Section::Chat.path()),
        '5' => Some(Section::Setting.path()),
        '6' => Some(Section::About.path()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_cycle_both_ways() {
        assert_eq!(Section::Home.next(), Section::Chat);
        assert_eq!(Section::About.next(), Section::Home);
        assert_eq!(Section::Home.previous(), Section::About);
    }

    #[test]
    fn section_of_path() {
        assert_eq!(Section::of("/home/tags"), Some(Section::Home));
        assert_eq!(Section::of("/about"), Some(Section::About));
        assert_eq!(Section::of("/homework"), None);
        assert_eq!(Section::of("/"), None);
    }

    #[test]
    fn home_tabs_wrap() {
        assert_eq!(HomeTab::Online.next(), HomeTab::Ollama);
        assert_eq!(HomeTab::Ollama.previous(), HomeTab::Online);
        assert_eq!(HomeTab::of("/home/online"), Some(HomeTab::Online));
        assert_eq!(HomeTab::of("/chat"), None);
    }

    #[test]
    fn digit_shortcuts() {
        assert_eq!(shortcut('1'), Some("/home/ollama"));
        assert_eq!(shortcut('6'), Some("/about"));
        assert_eq!(shortcut('7'), None);
    }
}
