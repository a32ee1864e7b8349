// Built-in protection lists plus per-guild additions.
//
// Bad-word matching runs against normalized text (see normalizer.rs), so
// the lists only carry canonical spellings and evasions the normalizer
// cannot fold (phonetic swaps like "phuck", abbreviations like "stfu").
// Domain matching is substring containment against the host part of a URL.

use std::collections::HashSet;

use once_cell::sync::Lazy;

static ENGLISH: &[&str] = &[
    // Heavy profanity
    "fuck", "fucking", "fucked", "fucker", "fuckers", "fucks",
    "motherfucker", "motherfucking", "motherfuckers",
    "shit", "shitty", "shitting", "bullshit", "horseshit", "dipshit", "shithead",
    "bitch", "bitches", "bitchass", "bitching", "sonofabitch",
    "ass", "asshole", "assholes", "dumbass", "fatass", "jackass", "smartass",
    "asshat", "assclown", "arsehole",
    "dick", "dickhead", "dickheads", "dickwad", "dickface",
    "cunt", "cunts",
    "bastard", "bastards",
    "damn", "goddamn", "damnit",
    "piss", "pissed", "pissoff", "pissing",
    "douche", "douchebag", "douchebags",
    "wanker", "wankers", "tosser", "twat", "twats",
    "bollocks", "bugger",
    "arse", "pillock", "plonker", "prat",
    "knobhead", "bellend", "minger", "numpty",
    // Sexual slurs
    "whore", "whores", "slut", "sluts", "slutty",
    "hoe", "hoes", "skank", "skanks",
    "hooker", "prostitute",
    "cock", "cocks", "cocksucker", "cocksuckers",
    "penis", "vagina", "pussy", "pussies",
    "cum", "cumshot", "cumming", "creampie",
    "blowjob", "handjob", "rimjob",
    "dildo",
    "tits", "titties", "boobs", "boobies",
    "jizz", "spunk", "semen",
    "orgasm", "orgy", "gangbang",
    "masturbate", "masturbation", "fap", "fapping",
    "erection", "boner",
    "deepthroat", "throatfuck",
    "anus", "butthole", "buttplug",
    "queef",
    // Racial / hate slurs
    "nigga", "niggas", "nigger", "niggers",
    "chink", "chinks", "gook", "gooks",
    "spic", "spics", "wetback", "wetbacks", "beaner", "beaners",
    "kike", "kikes",
    "paki", "pakis",
    "wop", "wops", "dago", "dagos",
    "coon", "coons", "darkie", "darkies",
    "honky", "honkey",
    "sandnigger", "towelhead",
    "zipperhead",
    // Homophobic / transphobic
    "fag", "fags", "faggot", "faggots", "faggy",
    "dyke", "dykes",
    "tranny", "trannies", "shemale", "shemales",
    "ladyboy", "heshe",
    "homo", "homos",
    // Ableist
    "retard", "retarded", "retards", "tard", "tards",
    "spastic", "spaz", "spazzy",
    "mongoloid",
    // Violence / self-harm bait
    "kys", "killyourself", "kill yourself",
    "neck yourself", "go die", "drink bleach",
    "rope yourself", "end yourself",
    "slit your wrists", "cut yourself",
    // Misc offensive
    "nazi", "nazis", "hitler", "sieg heil",
    "kkk", "ku klux", "white power", "white supremacy",
    "rape", "raping", "rapist", "rapists", "raped",
    "molest", "molester", "molestation",
    "pedo", "pedophile", "pedophiles", "paedophile",
    "incest",
    // NSFW keywords
    "porn", "porno", "pornography", "pornhub",
    "hentai", "xxx", "nsfw",
    "xvideos", "xnxx", "xhamster",
    "brazzers", "onlyfans", "chaturbate",
    "rule34", "e621",
    "yiff", "furporn",
    "loli", "lolicon", "shotacon", "shota",
    "ahegao",
    "milf",
    "camgirl", "camboy",
    "sexting", "nudes", "dickpic", "dickpics",
    // Evasions the normalizer cannot fold
    "fvck", "phuck", "phuk", "fuk", "fuq", "fck", "fcking", "fcked",
    "niqqer", "niqqa",
    "pron",
    "stfu", "gtfo",
    "wtf",
];

static TURKISH: &[&str] = &[
    "amk", "amq", "amina", "aminakoyim", "aminakoyayim", "aminakodugum",
    "aminakoydugum", "amkoglu",
    "anani", "ananin", "anasini", "ananisikim",
    "orospu", "orospucocugu", "orosbucocu",
    "sik", "sikik", "siktir", "sikerim", "sikeyim", "sikim", "sikimi",
    "sikicem", "siktirgit", "siktigimin", "sikmek", "siken", "sikici",
    "yarrak", "yarak", "yarram",
    "got", "gotun", "gotune", "gotveren", "gotlek",
    "pic", "pickurusu",
    "pezevenk",
    "kodumun", "kodumunun",
    "ibne", "ibneler",
    "gavat",
    "kaltak",
    "fahise",
    "amcik", "amciklar",
    "tasak", "dassak",
    "sikismek",
    "serefsiz",
    "dangalak",
    "gerizekali",
    "salak",
    "yavsak",
    "kahpe",
    "pust",
    "hiyar",
    "surtuk",
    "namussuz",
    "ahlaksiz",
    "itoglu",
    "bok", "boktan",
    "hassiktir", "hsktr",
    "zikkim",
    "sicmak",
];

static GERMAN: &[&str] = &[
    "scheisse", "scheiss",
    "fick", "ficken", "ficker", "gefickt",
    "arschloch", "arsch",
    "hurensohn", "hure", "huren",
    "wichser", "wichsen",
    "fotze", "fotzen",
    "schwanz",
    "missgeburt",
    "bastard",
    "vollidiot",
    "drecksau",
    "spasti",
    "schwuchtel",
    "kanake",
    "nazischwein",
];

static SPANISH: &[&str] = &[
    "puta", "putas", "putamadre", "hijo de puta",
    "mierda", "mierdas",
    "joder", "jodido", "jodete",
    "pendejo", "pendejos", "pendeja",
    "cabron", "cabrones",
    "chinga", "chingada", "chingado", "chingar",
    "verga",
    "marica", "maricon",
    "perra", "perras",
    "zorra", "zorras",
    "gonorrea",
    "malparido", "malparida",
    "hijueputa",
    "mamon",
];

static FRENCH: &[&str] = &[
    "merde", "putain", "pute", "putes",
    "connard", "connards", "connasse", "connasses",
    "encule", "enculer",
    "salaud", "salauds", "salope", "salopes",
    "foutre",
    "nique", "niquer", "niquetamere", "ntm",
    "fils de pute", "fdp",
    "batard",
    "couilles",
    "branleur", "branler",
    "pede",
    "trouduc",
];

static RUSSIAN: &[&str] = &[
    "blyad", "blyat", "blyadi", "cyka", "suka",
    "pizdec", "pizda", "pizdets",
    "nahui", "nahuy", "nahuj",
    "ebat", "eblan", "ebal",
    "mudak", "mudilo",
    "gandon",
    "zalupa",
    "debil",
    "ueban",
    "pidor", "pidoras",
    "svoloch",
    "dolboeb", "dolboyob",
    "idi nahui", "poshel nahui",
    "yob tvoyu mat",
];

static PORTUGUESE: &[&str] = &[
    "porra", "caralho", "foda", "foder", "fodido", "fodase",
    "bosta",
    "putaria", "filho da puta",
    "cuzao",
    "vai se foder", "vai tomar no cu",
    "viado",
    "arrombado", "arrombada",
    "desgracado",
    "otario",
    "babaca",
    "buceta", "xoxota", "xereca",
    "piroca",
    "punheta", "punheteiro",
    "corno",
];

/// All built-in words, deduplicated across languages.
static BUILTIN_BAD_WORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    let mut seen = HashSet::new();
    [ENGLISH, TURKISH, GERMAN, SPANISH, FRENCH, RUSSIAN, PORTUGUESE]
        .iter()
        .flat_map(|list| list.iter().copied())
        .filter(|w| seen.insert(*w))
        .collect()
});

/// Scam, phishing, IP-logger, malware, NSFW and shortener domains.
/// Matched by containment, so "grabify.link" also catches subdomains.
static BUILTIN_BLOCKED_DOMAINS: &[&str] = &[
    // Discord phishing
    "discord.gift", "discordgift.com",
    "dlscord.com", "dlscord.org", "dlscord.gg",
    "discordi.com", "discorcl.com", "disc0rd.com",
    "discord-nitro.com", "discordnitro.com",
    "discord-app.com", "discordapp.co", "discordapp.net",
    "dis-cord.com",
    "dlscord-app.com", "dlscordapp.com",
    "discrod.com", "dicsord.com", "disocrd.com",
    "discord-give.com", "discord-airdrop.com",
    "discordsteam.com", "discord-hypesquad.com",
    "discord-partner.com",
    "discordgiveaway.com", "discord-drop.com",
    "discordappgift.com",
    "nitro-gift.com", "nitro-drop.com",
    "free-nitro.com", "freenitro.com",
    "claim-nitro.com", "nitrodiscord.com",
    "gift-discord.com", "claimdiscord.com",
    "discord-claim.com",
    // Steam phishing
    "steamcommunlty.com", "steamcommunlty.ru",
    "steancommunity.com", "steamcommunity.ru",
    "steamcommunitv.com", "steamcornmunity.com",
    "steamcomrnunity.com", "steammcommunity.com",
    "store-steampowered.com", "steampowored.com",
    "steampowerd.com", "stearnpowered.com",
    "steamtrade.me", "steamtrading.org",
    "csgo-skins.com", "csgo-drop.com",
    "csgofree.com", "skinsfree.com",
    "steamgifts.pro", "steam-gifts.com",
    // General phishing
    "free-robux.com", "freerobux.gg",
    "vbucks-free.com", "freevbucks.com",
    "roblox-free.com",
    "fortnite-free.com",
    "minecraft-free.com",
    "gift-cards-free.com",
    "amazon-gift.com",
    // IP loggers / grabbers
    "grabify.link", "iplogger.com", "iplogger.org", "iplogger.co",
    "2no.co", "ipgrabber.ru", "iplis.ru",
    "blasze.tk", "yip.su",
    "shrekis.life",
    "headshot.monster", "gaming-at-my.best",
    "progaming.monster", "yourmy.monster",
    "ezstat.ru", "whatstheirip.com",
    "myiptest.com", "ipsnoop.com",
    // Malware / RAT hosting
    "anonfiles.com",
    "mediafire.com",
    "mega.nz",
    "gofile.io",
    "file.io",
    "anonymousfiles.io",
    "transfer.sh",
    "fileditch.com",
    "bayfiles.com",
    // NSFW
    "pornhub.com", "xvideos.com", "xnxx.com",
    "xhamster.com", "redtube.com", "youporn.com",
    "brazzers.com", "onlyfans.com", "fansly.com",
    "chaturbate.com", "stripchat.com", "cam4.com",
    "bongacams.com", "livejasmin.com", "myfreecams.com",
    "rule34.xxx", "rule34.paheal.net",
    "e621.net", "e926.net",
    "nhentai.net", "nhentai.to",
    "hanime.tv", "hentaihaven.xxx",
    "gelbooru.com", "danbooru.donmai.us",
    "sankakucomplex.com",
    "fapello.com", "thothub.tv",
    "erome.com", "noodlemagazine.com",
    "spankbang.com", "tnaflix.com",
    "tube8.com", "beeg.com",
    "motherless.com", "efukt.com",
    // URL shorteners
    "bit.ly", "tinyurl.com", "shorturl.at",
    "goo.gl", "is.gd", "v.gd",
    "rb.gy", "cutt.ly", "ow.ly",
    "adf.ly", "ouo.io", "bc.vc",
    "exe.io", "za.gl", "shrink.pe",
    "short.io", "clck.ru",
    "rebrand.ly", "bl.ink",
    "smarturl.it",
    // Crypto scam
    "freecrypto.com", "freebitcoin.io",
    "crypto-airdrop.com", "btc-drop.com",
    "ethereum-giveaway.com",
    "elon-crypto.com",
    // Token grabbers / webhook exfil
    "discordtokengrabber.com",
    "webhook.site",
    "hookbin.com",
    "requestbin.com",
];

/// Domains that bypass the general anti-link rule. Also containment-based,
/// so "google.com" covers "docs.google.com".
static ALLOWED_DOMAINS: &[&str] = &[
    // Discord
    "discord.com", "discord.gg", "discordapp.com",
    "cdn.discordapp.com", "media.discordapp.net",
    // Google
    "google.com", "googleapis.com",
    "youtube.com", "youtu.be",
    "docs.google.com", "drive.google.com",
    // Social media
    "twitter.com", "x.com",
    "instagram.com", "facebook.com", "fb.com",
    "tiktok.com",
    "reddit.com",
    "pinterest.com", "linkedin.com",
    "snapchat.com", "threads.net",
    "bsky.app", "mastodon.social",
    // Streaming
    "twitch.tv",
    "spotify.com",
    "soundcloud.com", "music.apple.com",
    "deezer.com", "tidal.com",
    // Gaming
    "steampowered.com", "steamcommunity.com",
    "epicgames.com",
    "roblox.com", "minecraft.net",
    "ea.com", "ubisoft.com",
    "xbox.com", "playstation.com",
    "leagueoflegends.com",
    "blizzard.com", "battle.net",
    // Dev
    "github.com",
    "gitlab.com", "bitbucket.org",
    "stackoverflow.com", "stackexchange.com",
    "npmjs.com", "pypi.org", "crates.io",
    "replit.com", "codepen.io",
    "vercel.app", "netlify.app",
    // Media / images
    "imgur.com",
    "tenor.com", "giphy.com",
    "prnt.sc",
    "flickr.com", "unsplash.com",
    // Reference
    "wikipedia.org", "wikimedia.org",
    "fandom.com",
    "archive.org",
    // News
    "bbc.com", "cnn.com", "reuters.com",
    "theguardian.com", "nytimes.com",
    // Misc trusted
    "paypal.com", "patreon.com",
    "ko-fi.com", "buymeacoffee.com",
    "amazon.com", "ebay.com",
    "notion.so", "notion.site",
    "canva.com", "figma.com",
    "trello.com", "asana.com",
];

/// Built-in lists merged with a guild's custom words and domains.
///
/// Custom entries are lowercased on construction; callers pass text that
/// already went through the normalizer.
#[derive(Debug, Default, Clone)]
pub struct GuildLexicon {
    custom_words: Vec<String>,
    custom_domains: Vec<String>,
}

impl GuildLexicon {
    pub fn new(custom_words: Vec<String>, custom_domains: Vec<String>) -> Self {
        Self {
            custom_words: custom_words.into_iter().map(|w| w.to_lowercase()).collect(),
            custom_domains: custom_domains
                .into_iter()
                .map(|d| d.to_lowercase())
                .collect(),
        }
    }

    /// First bad word found in `normalized`, built-ins before guild words.
    pub fn find_bad_word(&self, normalized: &str) -> Option<&str> {
        BUILTIN_BAD_WORDS
            .iter()
            .copied()
            .find(|w| word_matches(normalized, w))
            .or_else(|| {
                self.custom_words
                    .iter()
                    .map(String::as_str)
                    .find(|w| word_matches(normalized, w))
            })
    }

    /// Blocked-list entry contained in `domain`, if any.
    pub fn find_blocked_domain(&self, domain: &str) -> Option<&str> {
        BUILTIN_BLOCKED_DOMAINS
            .iter()
            .copied()
            .find(|blocked| domain.contains(blocked))
            .or_else(|| {
                self.custom_domains
                    .iter()
                    .map(String::as_str)
                    .find(|blocked| domain.contains(blocked))
            })
    }
}

/// Whether `domain` is on the allow list for the general anti-link rule.
pub fn is_allowed_domain(domain: &str) -> bool {
    ALLOWED_DOMAINS.iter().any(|allowed| domain.contains(allowed))
}

/// Number of built-in bad words, for the status embed.
pub fn builtin_word_count() -> usize {
    BUILTIN_BAD_WORDS.len()
}

/// Number of built-in blocked domains, for the status embed.
pub fn builtin_domain_count() -> usize {
    BUILTIN_BLOCKED_DOMAINS.len()
}

/// Words of three characters or fewer only match on word boundaries, so
/// "ass" flags "you ass" but not "class". Longer words match anywhere,
/// catching embedded forms like "xxasshole".
fn word_matches(text: &str, word: &str) -> bool {
    if word.chars().count() > 3 {
        return text.contains(word);
    }
    for (idx, _) in text.match_indices(word) {
        let before_ok = text[..idx]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = text[idx + word.len()..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_words_need_boundaries() {
        let lex = GuildLexicon::default();
        assert_eq!(lex.find_bad_word("you ass"), Some("ass"));
        assert_eq!(lex.find_bad_word("ass"), Some("ass"));
        assert_eq!(lex.find_bad_word("going to class"), None);
        assert_eq!(lex.find_bad_word("classic passage"), None);
    }

    #[test]
    fn long_words_match_embedded() {
        let lex = GuildLexicon::default();
        assert!(lex.find_bad_word("what an asshole!").is_some());
        assert!(lex.find_bad_word("xxassholexx").is_some());
    }

    #[test]
    fn clean_text_passes() {
        let lex = GuildLexicon::default();
        assert_eq!(lex.find_bad_word("hello there, nice weather"), None);
        assert_eq!(lex.find_bad_word(""), None);
    }

    #[test]
    fn custom_words_are_checked() {
        let lex = GuildLexicon::new(vec!["Bananas".into()], vec![]);
        assert_eq!(lex.find_bad_word("i love bananas"), Some("bananas"));
    }

    #[test]
    fn blocked_domains_match_by_containment() {
        let lex = GuildLexicon::default();
        assert_eq!(lex.find_blocked_domain("grabify.link"), Some("grabify.link"));
        assert_eq!(
            lex.find_blocked_domain("sub.grabify.link"),
            Some("grabify.link")
        );
        assert_eq!(lex.find_blocked_domain("example.com"), None);
    }

    #[test]
    fn custom_domains_are_checked() {
        let lex = GuildLexicon::new(vec![], vec!["evil.example".into()]);
        assert_eq!(lex.find_blocked_domain("evil.example"), Some("evil.example"));
    }

    #[test]
    fn allow_list_covers_subdomains() {
        assert!(is_allowed_domain("discord.com"));
        assert!(is_allowed_domain("www.youtube.com"));
        assert!(!is_allowed_domain("totally-not-a-scam.biz"));
    }

    #[test]
    fn builtin_lists_are_nonempty() {
        assert!(builtin_word_count() > 300);
        assert!(builtin_domain_count() > 100);
    }
}
