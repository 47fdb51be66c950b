#[derive(Clone, clap::ValueEnum, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Script {
    #[strum(serialize = "weather")]
    #[value(name = "weather")]
    Weather,
    #[strum(serialize = "recipe")]
    #[value(name = "recipe")]
    Recipe,
    #[strum(serialize = "one-word")]
    #[value(name = "one-word")]
    OneWord,
}

impl Script {
    pub fn text(&self) -> &'static str {
        match self {
            Self::Weather => {
                "Tomorrow looks mostly sunny with a light breeze from the west. \
                 Expect a high of twenty two degrees in the afternoon, and a chance \
                 of showers after sunset, so keep an umbrella close by."
            }
            Self::Recipe => {
                "Start by warming a little olive oil in a wide pan. Add the sliced \
                 onions and let them soften for about ten minutes, then stir in the \
                 garlic, the tomatoes and a pinch of salt."
            }
            Self::OneWord => "Absolutely.",
        }
    }

    /// Cut the text into uneven fragments the way a token stream would,
    /// including splits in the middle of words.
    pub fn fragments(&self) -> Vec<String> {
        const SIZES: [usize; 5] = [7, 3, 11, 5, 9];

        let chars: Vec<char> = self.text().chars().collect();
        let mut fragments = Vec::new();
        let mut pos = 0;
        for size in SIZES.iter().cycle() {
            if pos >= chars.len() {
                break;
            }
            let end = (pos + size).min(chars.len());
            fragments.push(chars[pos..end].iter().collect());
            pos = end;
        }
        fragments
    }
}
