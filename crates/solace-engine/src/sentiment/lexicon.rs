//! Rule tables for the valence scorer.
//!
//! `LEXICON` is a curated subset of the VADER valence lexicon, weighted
//! toward the emotional vocabulary that shows up in support conversations.
//! Values are mean human ratings on a -4..=4 scale.

/// Scalar added (or subtracted) by an intensifier or dampener.
pub const B_INCR: f64 = 0.293;
pub const B_DECR: f64 = -0.293;

/// Extra weight for a sentiment word written in ALL CAPS among mixed-case text.
pub const C_INCR: f64 = 0.733;

/// Multiplier applied to a negated valence.
pub const N_SCALAR: f64 = -0.74;

/// Normalization constant for the compound score.
pub const ALPHA: f64 = 15.0;

pub const NEGATIONS: &[&str] = &[
    "aint", "arent", "cannot", "cant", "couldnt", "darent", "didnt", "doesnt",
    "ain't", "aren't", "can't", "couldn't", "daren't", "didn't", "doesn't",
    "dont", "hadnt", "hasnt", "havent", "isnt", "mightnt", "mustnt", "neither",
    "don't", "hadn't", "hasn't", "haven't", "isn't", "mightn't", "mustn't",
    "neednt", "needn't", "never", "none", "nope", "nor", "not", "nothing",
    "nowhere", "oughtnt", "shant", "shouldnt", "uhuh", "wasnt", "werent",
    "oughtn't", "shan't", "shouldn't", "uh-uh", "wasn't", "weren't",
    "without", "wont", "wouldnt", "won't", "wouldn't", "rarely", "seldom",
    "despite",
];

pub const BOOSTERS: &[(&str, f64)] = &[
    ("absolutely", B_INCR),
    ("amazingly", B_INCR),
    ("awfully", B_INCR),
    ("completely", B_INCR),
    ("considerable", B_INCR),
    ("considerably", B_INCR),
    ("decidedly", B_INCR),
    ("deeply", B_INCR),
    ("effing", B_INCR),
    ("enormous", B_INCR),
    ("enormously", B_INCR),
    ("entirely", B_INCR),
    ("especially", B_INCR),
    ("exceptional", B_INCR),
    ("exceptionally", B_INCR),
    ("extreme", B_INCR),
    ("extremely", B_INCR),
    ("fabulously", B_INCR),
    ("flipping", B_INCR),
    ("flippin", B_INCR),
    ("fricking", B_INCR),
    ("frickin", B_INCR),
    ("frigging", B_INCR),
    ("friggin", B_INCR),
    ("fully", B_INCR),
    ("fucking", B_INCR),
    ("greatly", B_INCR),
    ("hella", B_INCR),
    ("highly", B_INCR),
    ("hugely", B_INCR),
    ("incredible", B_INCR),
    ("incredibly", B_INCR),
    ("intensely", B_INCR),
    ("major", B_INCR),
    ("majorly", B_INCR),
    ("more", B_INCR),
    ("most", B_INCR),
    ("particularly", B_INCR),
    ("purely", B_INCR),
    ("quite", B_INCR),
    ("really", B_INCR),
    ("remarkably", B_INCR),
    ("so", B_INCR),
    ("substantially", B_INCR),
    ("thoroughly", B_INCR),
    ("total", B_INCR),
    ("totally", B_INCR),
    ("tremendous", B_INCR),
    ("tremendously", B_INCR),
    ("uber", B_INCR),
    ("unbelievably", B_INCR),
    ("unusually", B_INCR),
    ("utter", B_INCR),
    ("utterly", B_INCR),
    ("very", B_INCR),
    ("almost", B_DECR),
    ("barely", B_DECR),
    ("hardly", B_DECR),
    ("just enough", B_DECR),
    ("kind of", B_DECR),
    ("kinda", B_DECR),
    ("kindof", B_DECR),
    ("kind-of", B_DECR),
    ("less", B_DECR),
    ("little", B_DECR),
    ("marginal", B_DECR),
    ("marginally", B_DECR),
    ("occasional", B_DECR),
    ("occasionally", B_DECR),
    ("partly", B_DECR),
    ("scarce", B_DECR),
    ("scarcely", B_DECR),
    ("slight", B_DECR),
    ("slightly", B_DECR),
    ("somewhat", B_DECR),
    ("sort of", B_DECR),
    ("sorta", B_DECR),
    ("sortof", B_DECR),
    ("sort-of", B_DECR),
];

/// Multi-word idioms whose valence replaces the computed one.
pub const SPECIAL_CASES: &[(&str, f64)] = &[
    ("the shit", 3.0),
    ("the bomb", 3.0),
    ("bad ass", 1.5),
    ("badass", 1.5),
    ("bus stop", 0.0),
    ("yeah right", -2.0),
    ("kiss of death", -1.5),
    ("to die for", 3.0),
    ("beating heart", 3.1),
    ("broken heart", -2.9),
];

pub const LEXICON: &[(&str, f64)] = &[
    // emoticons (matched lowercased)
    (":)", 2.0),
    (":-)", 1.3),
    (":(", -1.9),
    (":-(", -1.5),
    (":d", 2.3),
    (":'(", -2.2),
    ("<3", 1.9),
    // a
    ("abandon", -1.9),
    ("abandoned", -2.0),
    ("abuse", -3.2),
    ("abused", -2.3),
    ("accept", 1.6),
    ("accepted", 1.1),
    ("ache", -1.6),
    ("aching", -2.0),
    ("admire", 2.1),
    ("adore", 2.6),
    ("afraid", -2.0),
    ("agitated", -2.0),
    ("agony", -1.8),
    ("alarmed", -1.4),
    ("alone", -1.0),
    ("amazing", 2.8),
    ("angry", -2.3),
    ("anguish", -2.9),
    ("annoyed", -1.6),
    ("annoying", -1.8),
    ("anxiety", -0.7),
    ("anxious", -1.0),
    ("apathetic", -1.2),
    ("appreciate", 1.7),
    ("appreciated", 2.3),
    ("ashamed", -2.1),
    ("awesome", 3.1),
    ("awful", -2.0),
    ("awkward", -0.6),
    // b
    ("bad", -2.5),
    ("beautiful", 2.9),
    ("best", 3.2),
    ("better", 1.9),
    ("bitter", -1.8),
    ("blame", -1.4),
    ("bless", 1.8),
    ("blessed", 2.9),
    ("bored", -1.1),
    ("boring", -1.3),
    ("brave", 2.4),
    ("broke", -1.8),
    ("broken", -2.1),
    ("burden", -1.9),
    // c
    ("calm", 1.3),
    ("care", 2.2),
    ("caring", 2.2),
    ("cheer", 2.3),
    ("cheerful", 2.5),
    ("comfort", 1.5),
    ("comfortable", 2.3),
    ("confident", 2.2),
    ("confused", -1.3),
    ("crap", -1.6),
    ("crazy", -1.4),
    ("cried", -1.6),
    ("cruel", -2.8),
    ("cry", -2.1),
    ("crying", -2.1),
    // d
    ("dead", -3.3),
    ("death", -2.9),
    ("defeated", -2.1),
    ("depressed", -2.3),
    ("depressing", -2.1),
    ("depression", -2.7),
    ("despair", -3.0),
    ("desperate", -1.3),
    ("destroyed", -2.4),
    ("die", -2.9),
    ("died", -2.6),
    ("disappointed", -1.9),
    ("disappointing", -2.2),
    ("disaster", -3.1),
    ("discouraged", -1.7),
    ("disgusted", -2.4),
    ("dread", -2.0),
    ("dying", -2.1),
    // e
    ("empty", -0.8),
    ("encouraged", 1.5),
    ("energetic", 1.9),
    ("enjoy", 2.2),
    ("enjoyed", 2.3),
    ("excellent", 2.7),
    ("excited", 1.4),
    ("exciting", 2.2),
    ("exhausted", -1.5),
    // f
    ("fail", -2.5),
    ("failed", -2.3),
    ("failure", -2.3),
    ("fantastic", 2.6),
    ("fear", -2.2),
    ("fearful", -2.2),
    ("fine", 0.8),
    ("free", 2.3),
    ("friendly", 2.2),
    ("frightened", -1.9),
    ("frustrated", -2.4),
    ("frustrating", -1.9),
    ("fun", 2.3),
    ("furious", -2.7),
    // g
    ("glad", 2.0),
    ("gloomy", -1.8),
    ("good", 1.9),
    ("grateful", 2.0),
    ("great", 3.1),
    ("grief", -2.2),
    ("guilt", -1.1),
    ("guilty", -1.8),
    // h
    ("happiness", 2.6),
    ("happy", 2.7),
    ("hate", -2.7),
    ("hated", -3.2),
    ("heartbroken", -3.3),
    ("help", 1.7),
    ("helpful", 1.8),
    ("helpless", -2.0),
    ("hope", 1.9),
    ("hopeful", 2.3),
    ("hopeless", -2.0),
    ("hopelessness", -2.1),
    ("horrible", -2.5),
    ("hurt", -2.4),
    ("hurting", -2.1),
    // i
    ("insecure", -1.8),
    ("inspired", 2.2),
    ("irritated", -2.0),
    ("isolated", -1.3),
    // j
    ("joy", 2.8),
    ("joyful", 2.9),
    // k
    ("kill", -3.7),
    ("killed", -3.5),
    ("kind", 2.4),
    // l
    ("laugh", 2.6),
    ("laughing", 2.2),
    ("lonely", -1.5),
    ("loneliness", -1.8),
    ("lose", -1.3),
    ("losing", -1.6),
    ("loss", -1.3),
    ("lost", -1.3),
    ("love", 3.2),
    ("loved", 2.9),
    ("lovely", 2.8),
    ("loving", 2.9),
    ("lucky", 1.8),
    // m
    ("mad", -2.2),
    ("mess", -1.5),
    ("miserable", -2.2),
    ("miss", -0.6),
    ("missed", -1.2),
    ("motivated", 1.4),
    // n
    ("nervous", -1.1),
    ("nice", 1.8),
    ("no", -1.2),
    ("numb", -1.4),
    // o
    ("ok", 1.2),
    ("okay", 0.9),
    ("overwhelmed", -1.5),
    // p
    ("pain", -2.3),
    ("painful", -1.9),
    ("panic", -2.3),
    ("peace", 2.5),
    ("peaceful", 2.2),
    ("pleased", 1.9),
    ("positive", 2.6),
    ("proud", 2.1),
    // r
    ("rage", -2.6),
    ("regret", -1.8),
    ("rejected", -1.7),
    ("relaxed", 2.2),
    ("relief", 2.1),
    ("relieved", 1.6),
    ("restless", -1.1),
    // s
    ("sad", -2.1),
    ("sadness", -1.9),
    ("safe", 1.9),
    ("scared", -1.9),
    ("scary", -2.2),
    ("shame", -2.1),
    ("sick", -2.3),
    ("smile", 1.5),
    ("smiling", 2.3),
    ("sorrow", -2.4),
    ("sorry", -0.3),
    ("stress", -1.8),
    ("stressed", -1.4),
    ("stressful", -2.0),
    ("strong", 2.3),
    ("struggle", -1.3),
    ("struggling", -1.8),
    ("stuck", -1.0),
    ("succeed", 2.2),
    ("success", 2.7),
    ("suffer", -2.5),
    ("suffering", -2.1),
    ("suicidal", -3.6),
    ("suicide", -3.5),
    ("support", 1.7),
    ("supported", 1.3),
    ("supportive", 1.2),
    ("sweet", 2.0),
    // t
    ("terrible", -2.1),
    ("terrified", -3.0),
    ("thank", 1.5),
    ("thankful", 2.7),
    ("thanks", 1.9),
    ("tired", -1.9),
    ("trapped", -2.4),
    ("trauma", -1.8),
    ("trust", 2.3),
    // u
    ("ugly", -2.3),
    ("unhappy", -1.8),
    ("upset", -1.6),
    ("useless", -1.8),
    // w
    ("want", 0.3),
    ("warm", 0.9),
    ("weak", -1.9),
    ("weary", -1.1),
    ("win", 2.8),
    ("wonderful", 2.7),
    ("worried", -1.2),
    ("worry", -1.9),
    ("worse", -2.1),
    ("worst", -3.1),
    ("worthless", -1.9),
    ("wrong", -2.1),
    // y
    ("yay", 2.4),
    ("yes", 1.7),
];
