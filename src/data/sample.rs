//! Built-in sample corpus
//!
//! A small hand-written set of annotated tweets used by the `demo` command
//! and by tests when no CSV is at hand.

use super::dataset::{Tweet, TweetDataset};

const SAMPLE_TWEETS: &[(&str, &str, &str)] = &[
    // Bullying traces
    ("y", "en", "You are such a loser, nobody at school wants to sit with you"),
    ("y", "en", "Everyone laughs at you in class because you are so stupid and ugly"),
    ("y", "en", "Go away freak, nobody likes you, just leave our school"),
    ("y", "en", "They pushed me into the locker again and called me fat in the hallway"),
    ("y", "en", "I was bullied at school every day, they stole my lunch and laughed"),
    ("y", "en", "Stop crying loser, you deserve to be bullied by everyone"),
    ("y", "en", "My son gets bullied on the bus, kids call him names and hit him"),
    ("y", "en", "She got cyberbullied online, mean messages telling her to disappear"),
    ("y", "en", "That kid is always picked on, they mock his clothes at school"),
    ("y", "en", "Nobody wants you here, ugly freak, everybody at school hates you"),
    ("y", "en", "The bully punched him in the playground and the kids laughed"),
    ("y", "en", "I got teased and called names every single day in middle school"),
    ("y", "es", "Eres un perdedor, nadie te quiere en la escuela"),
    // No bullying traces
    ("n", "en", "Great game last night, the team played really well"),
    ("n", "en", "Just finished my homework, time to watch a movie with friends"),
    ("n", "en", "Anti bullying week starts Monday, join the school assembly"),
    ("n", "en", "Loving this sunny weather, going to the beach this weekend"),
    ("n", "en", "New coffee shop downtown has amazing pastries and music"),
    ("n", "en", "Watching the game with friends tonight, the team needs a win"),
    ("n", "en", "Our class organized a great science fair at school today"),
    ("n", "en", "Happy birthday to my best friend, have an amazing day"),
    ("n", "en", "The concert last night was amazing, the band played all the hits"),
    ("n", "en", "Weekend plans: beach, movie and pizza with the family"),
    ("n", "en", "Read a great book about kindness and friendship this week"),
    ("n", "en", "Morning run done, the weather is perfect for a long walk"),
    ("n", "fr", "Quelle belle journée pour une promenade au parc"),
];

/// Build the sample dataset
pub fn sample_dataset() -> TweetDataset {
    let tweets = SAMPLE_TWEETS
        .iter()
        .enumerate()
        .map(|(i, (label, lang, text))| Tweet::new((i + 1).to_string(), *text, *label, *lang))
        .collect();

    TweetDataset::new(tweets)
}
