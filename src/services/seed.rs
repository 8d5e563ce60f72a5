use crate::models::{Icebreaker, Profile};

/// Built-in demo deck used when no external profile source is wired up
///
/// Mirrors the seed data the app ships with; every profile carries at
/// least one image and a set of interest tags.
pub fn demo_profiles() -> Vec<Profile> {
    vec![
        Profile {
            id: "1".to_string(),
            name: "Elena".to_string(),
            age: 24,
            bio: "Art director and coffee enthusiast. I love hiking and film photography. \
                  Looking for someone to share morning runs with."
                .to_string(),
            images: vec![
                "profiles/elena-1.jpg".to_string(),
                "profiles/elena-2.jpg".to_string(),
            ],
            interests: strings(&["Art", "Coffee", "Nature", "Fitness"]),
            distance: "2 km".to_string(),
            icebreaker: Some(Icebreaker {
                question: "MY SUPERPOWER".to_string(),
                answer: "Finding the best local coffee spots ☕️".to_string(),
            }),
        },
        Profile {
            id: "2".to_string(),
            name: "Marcus".to_string(),
            age: 28,
            bio: "Software engineer by day, jazz pianist by night. Let's talk about tech, \
                  music, or the best ramen spots in town."
                .to_string(),
            images: vec![
                "profiles/marcus-1.jpg".to_string(),
                "profiles/marcus-2.jpg".to_string(),
            ],
            interests: strings(&["Tech", "Music", "Cooking", "Gaming"]),
            distance: "5 km".to_string(),
            icebreaker: Some(Icebreaker {
                question: "UNPOPULAR OPINION".to_string(),
                answer: "Pineapple definitely belongs on pizza 🍕".to_string(),
            }),
        },
        Profile {
            id: "3".to_string(),
            name: "Sophia".to_string(),
            age: 22,
            bio: "Fashion student and part-time model. Always traveling and looking for \
                  the next big inspiration."
                .to_string(),
            images: vec![
                "profiles/sophia-1.jpg".to_string(),
                "profiles/sophia-2.jpg".to_string(),
            ],
            interests: strings(&["Fashion", "Photography", "Travel", "Art"]),
            distance: "10 km".to_string(),
            icebreaker: Some(Icebreaker {
                question: "DREAM DATE".to_string(),
                answer: "Rooftop sunset & vintage jazz records".to_string(),
            }),
        },
        Profile {
            id: "4".to_string(),
            name: "David".to_string(),
            age: 31,
            bio: "Chef. I believe everything in life is better with a good meal and great \
                  company."
                .to_string(),
            images: vec!["profiles/david-1.jpg".to_string()],
            interests: strings(&["Cooking", "Wine", "Business"]),
            distance: "3 km".to_string(),
            icebreaker: Some(Icebreaker {
                question: "MY RED FLAG".to_string(),
                answer: "I will critique your choice of pasta shape".to_string(),
            }),
        },
        Profile {
            id: "5".to_string(),
            name: "Olivia".to_string(),
            age: 26,
            bio: "Yoga instructor and wellness coach. Helping you find your inner peace \
                  while exploring the outer world."
                .to_string(),
            images: vec!["profiles/olivia-1.jpg".to_string()],
            interests: strings(&["Yoga", "Nature", "Fitness", "Coffee"]),
            distance: "8 km".to_string(),
            icebreaker: Some(Icebreaker {
                question: "OBSESSION".to_string(),
                answer: "Collecting rare succulents and indie zines".to_string(),
            }),
        },
    ]
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_demo_profiles_are_well_formed() {
        let profiles = demo_profiles();
        assert_eq!(profiles.len(), 5);

        let ids: HashSet<_> = profiles.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.len(), profiles.len(), "profile ids must be unique");

        for profile in &profiles {
            assert!(profile.age >= 18);
            assert!(!profile.images.is_empty());
            assert!(!profile.interests.is_empty());
        }
    }
}
