//! Item, mutation and variant tables for the value calculator

/// A harvestable item
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemSpec {
    pub id: &'static str,
    pub display_name: &'static str,
    pub base_value: f64,
    pub weight_divisor: f64,
}

/// A named multiplier (mutation or variant)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Multiplier {
    pub id: &'static str,
    pub display_name: &'static str,
    pub factor: f64,
}

#[rustfmt::skip]
pub const ITEMS: &[ItemSpec] = &[
    ItemSpec { id: "carrot", display_name: "Carrot", base_value: 20.0, weight_divisor: 0.275 },
    ItemSpec { id: "strawberry", display_name: "Strawberry", base_value: 15.0, weight_divisor: 0.3 },
    ItemSpec { id: "blueberry", display_name: "Blueberry", base_value: 20.0, weight_divisor: 0.2 },
    ItemSpec { id: "orange_tulip", display_name: "Orange Tulip", base_value: 850.0, weight_divisor: 0.05 },
    ItemSpec { id: "tomato", display_name: "Tomato", base_value: 30.0, weight_divisor: 0.5 },
    ItemSpec { id: "corn", display_name: "Corn", base_value: 40.0, weight_divisor: 2.0 },
    ItemSpec { id: "daffodil", display_name: "Daffodil", base_value: 1000.0, weight_divisor: 0.2 },
    ItemSpec { id: "watermelon", display_name: "Watermelon", base_value: 3000.0, weight_divisor: 7.0 },
    ItemSpec { id: "pumpkin", display_name: "Pumpkin", base_value: 3400.0, weight_divisor: 8.0 },
    ItemSpec { id: "apple", display_name: "Apple", base_value: 275.0, weight_divisor: 3.0 },
    ItemSpec { id: "bamboo", display_name: "Bamboo", base_value: 4000.0, weight_divisor: 4.0 },
    ItemSpec { id: "coconut", display_name: "Coconut", base_value: 400.0, weight_divisor: 14.0 },
    ItemSpec { id: "cactus", display_name: "Cactus", base_value: 3400.0, weight_divisor: 7.0 },
    ItemSpec { id: "dragon_fruit", display_name: "Dragon Fruit", base_value: 4750.0, weight_divisor: 12.0 },
    ItemSpec { id: "mango", display_name: "Mango", base_value: 6500.0, weight_divisor: 15.0 },
    ItemSpec { id: "grape", display_name: "Grape", base_value: 7850.0, weight_divisor: 3.0 },
    ItemSpec { id: "mushroom", display_name: "Mushroom", base_value: 151000.0, weight_divisor: 25.0 },
    ItemSpec { id: "pepper", display_name: "Pepper", base_value: 8000.0, weight_divisor: 5.0 },
    ItemSpec { id: "cacao", display_name: "Cacao", base_value: 12000.0, weight_divisor: 8.0 },
    ItemSpec { id: "beanstalk", display_name: "Beanstalk", base_value: 28000.0, weight_divisor: 10.0 },
    ItemSpec { id: "ember_lily", display_name: "Ember Lily", base_value: 66666.0, weight_divisor: 12.0 },
    ItemSpec { id: "sugar_apple", display_name: "Sugar Apple", base_value: 48000.0, weight_divisor: 9.0 },
    ItemSpec { id: "pineapple", display_name: "Pineapple", base_value: 2000.0, weight_divisor: 3.0 },
    ItemSpec { id: "cauliflower", display_name: "Cauliflower", base_value: 40.0, weight_divisor: 5.0 },
    ItemSpec { id: "green_apple", display_name: "Green Apple", base_value: 300.0, weight_divisor: 3.0 },
    ItemSpec { id: "banana", display_name: "Banana", base_value: 2000.0, weight_divisor: 1.5 },
    ItemSpec { id: "avocado", display_name: "Avocado", base_value: 350.0, weight_divisor: 6.5 },
    ItemSpec { id: "kiwi", display_name: "Kiwi", base_value: 2750.0, weight_divisor: 5.0 },
    ItemSpec { id: "bell_pepper", display_name: "Bell Pepper", base_value: 5500.0, weight_divisor: 8.0 },
    ItemSpec { id: "prickly_pear", display_name: "Prickly Pear", base_value: 7000.0, weight_divisor: 7.0 },
    ItemSpec { id: "feijoa", display_name: "Feijoa", base_value: 13000.0, weight_divisor: 10.0 },
    ItemSpec { id: "loquat", display_name: "Loquat", base_value: 8000.0, weight_divisor: 6.5 },
    ItemSpec { id: "wild_carrot", display_name: "Wild Carrot", base_value: 25000.0, weight_divisor: 0.3 },
    ItemSpec { id: "pear", display_name: "Pear", base_value: 20000.0, weight_divisor: 3.0 },
    ItemSpec { id: "cantaloupe", display_name: "Cantaloupe", base_value: 34000.0, weight_divisor: 5.5 },
    ItemSpec { id: "parasol_flower", display_name: "Parasol Flower", base_value: 200000.0, weight_divisor: 6.0 },
    ItemSpec { id: "rosy_delight", display_name: "Rosy Delight", base_value: 69000.0, weight_divisor: 10.0 },
    ItemSpec { id: "elephant_ears", display_name: "Elephant Ears", base_value: 77000.0, weight_divisor: 18.0 },
    ItemSpec { id: "chocolate_carrot", display_name: "Chocolate Carrot", base_value: 11000.0, weight_divisor: 0.275 },
    ItemSpec { id: "red_lollipop", display_name: "Red Lollipop", base_value: 50000.0, weight_divisor: 4.0 },
    ItemSpec { id: "blue_lollipop", display_name: "Blue Lollipop", base_value: 50000.0, weight_divisor: 1.0 },
    ItemSpec { id: "candy_sunflower", display_name: "Candy Sunflower", base_value: 80000.0, weight_divisor: 1.5 },
    ItemSpec { id: "easter_egg", display_name: "Easter Egg", base_value: 2500.0, weight_divisor: 3.0 },
    ItemSpec { id: "candy_blossom", display_name: "Candy Blossom", base_value: 100000.0, weight_divisor: 3.0 },
    ItemSpec { id: "peach", display_name: "Peach", base_value: 300.0, weight_divisor: 2.0 },
    ItemSpec { id: "raspberry", display_name: "Raspberry", base_value: 100.0, weight_divisor: 0.75 },
    ItemSpec { id: "papaya", display_name: "Papaya", base_value: 1000.0, weight_divisor: 3.0 },
    ItemSpec { id: "passionfruit", display_name: "Passionfruit", base_value: 3550.0, weight_divisor: 3.0 },
    ItemSpec { id: "soul_fruit", display_name: "Soul Fruit", base_value: 7750.0, weight_divisor: 25.0 },
    ItemSpec { id: "cursed_fruit", display_name: "Cursed Fruit", base_value: 25750.0, weight_divisor: 30.0 },
    ItemSpec { id: "mega_mushroom", display_name: "Mega Mushroom", base_value: 500.0, weight_divisor: 70.0 },
    ItemSpec { id: "cherry_blossom", display_name: "Cherry Blossom", base_value: 500.0, weight_divisor: 3.0 },
    ItemSpec { id: "purple_cabbage", display_name: "Purple Cabbage", base_value: 500.0, weight_divisor: 5.0 },
    ItemSpec { id: "lemon", display_name: "Lemon", base_value: 350.0, weight_divisor: 1.0 },
    ItemSpec { id: "pink_tulip", display_name: "Pink Tulip", base_value: 850.0, weight_divisor: 0.05 },
    ItemSpec { id: "cranberry", display_name: "Cranberry", base_value: 3500.0, weight_divisor: 1.0 },
    ItemSpec { id: "durian", display_name: "Durian", base_value: 7500.0, weight_divisor: 8.0 },
    ItemSpec { id: "eggplant", display_name: "Eggplant", base_value: 12000.0, weight_divisor: 5.0 },
    ItemSpec { id: "lotus", display_name: "Lotus", base_value: 35000.0, weight_divisor: 20.0 },
    ItemSpec { id: "venus_fly_trap", display_name: "Venus Fly Trap", base_value: 85000.0, weight_divisor: 10.0 },
    ItemSpec { id: "nightshade", display_name: "Nightshade", base_value: 3500.0, weight_divisor: 0.5 },
    ItemSpec { id: "glowshroom", display_name: "Glowshroom", base_value: 300.0, weight_divisor: 0.75 },
    ItemSpec { id: "mint", display_name: "Mint", base_value: 5250.0, weight_divisor: 1.0 },
    ItemSpec { id: "moonflower", display_name: "Moonflower", base_value: 9500.0, weight_divisor: 2.0 },
    ItemSpec { id: "starfruit", display_name: "Starfruit", base_value: 15000.0, weight_divisor: 3.0 },
    ItemSpec { id: "moonglow", display_name: "Moonglow", base_value: 25000.0, weight_divisor: 7.0 },
    ItemSpec { id: "moon_blossom", display_name: "Moon Blossom", base_value: 66666.0, weight_divisor: 3.0 },
    ItemSpec { id: "crimson_vine", display_name: "Crimson Vine", base_value: 1250.0, weight_divisor: 1.0 },
    ItemSpec { id: "moon_melon", display_name: "Moon Melon", base_value: 18000.0, weight_divisor: 8.0 },
    ItemSpec { id: "blood_banana", display_name: "Blood Banana", base_value: 6000.0, weight_divisor: 1.5 },
    ItemSpec { id: "celestiberry", display_name: "Celestiberry", base_value: 10000.0, weight_divisor: 2.0 },
    ItemSpec { id: "moon_mango", display_name: "Moon Mango", base_value: 50000.0, weight_divisor: 15.0 },
    ItemSpec { id: "rose", display_name: "Rose", base_value: 5000.0, weight_divisor: 1.0 },
    ItemSpec { id: "foxglove", display_name: "Foxglove", base_value: 20000.0, weight_divisor: 2.0 },
    ItemSpec { id: "lilac", display_name: "Lilac", base_value: 35000.0, weight_divisor: 3.0 },
    ItemSpec { id: "pink_lily", display_name: "Pink Lily", base_value: 65000.0, weight_divisor: 6.0 },
    ItemSpec { id: "purple_dahlia", display_name: "Purple Dahlia", base_value: 75000.0, weight_divisor: 12.0 },
    ItemSpec { id: "sunflower", display_name: "Sunflower", base_value: 160000.0, weight_divisor: 16.5 },
    ItemSpec { id: "lavender", display_name: "Lavender", base_value: 25000.0, weight_divisor: 0.275 },
    ItemSpec { id: "nectarshade", display_name: "Nectarshade", base_value: 50000.0, weight_divisor: 0.8 },
    ItemSpec { id: "nectarine", display_name: "Nectarine", base_value: 48000.0, weight_divisor: 3.0 },
    ItemSpec { id: "hive_fruit", display_name: "Hive Fruit", base_value: 62000.0, weight_divisor: 8.0 },
    ItemSpec { id: "manuka_flower", display_name: "Manuka Flower", base_value: 25000.0, weight_divisor: 0.3 },
    ItemSpec { id: "dandelion", display_name: "Dandelion", base_value: 50000.0, weight_divisor: 4.0 },
    ItemSpec { id: "lumira", display_name: "Lumira", base_value: 85000.0, weight_divisor: 6.0 },
    ItemSpec { id: "honeysuckle", display_name: "Honeysuckle", base_value: 100000.0, weight_divisor: 12.0 },
    ItemSpec { id: "crocus", display_name: "Crocus", base_value: 30000.0, weight_divisor: 0.275 },
    ItemSpec { id: "succulent", display_name: "Succulent", base_value: 25000.0, weight_divisor: 5.0 },
    ItemSpec { id: "violet_corn", display_name: "Violet Corn", base_value: 50000.0, weight_divisor: 3.0 },
    ItemSpec { id: "bendboo", display_name: "Bendboo", base_value: 155000.0, weight_divisor: 18.0 },
    ItemSpec { id: "cocovine", display_name: "Cocovine", base_value: 66666.0, weight_divisor: 14.0 },
    ItemSpec { id: "dragon_pepper", display_name: "Dragon Pepper", base_value: 88888.0, weight_divisor: 6.0 },
    ItemSpec { id: "bee_balm", display_name: "Bee Balm", base_value: 18000.0, weight_divisor: 1.0 },
    ItemSpec { id: "nectar_thorn", display_name: "Nectar Thorn", base_value: 44444.0, weight_divisor: 7.0 },
    ItemSpec { id: "suncoil", display_name: "Suncoil", base_value: 80000.0, weight_divisor: 10.0 },
    ItemSpec { id: "noble_flower", display_name: "Noble Flower", base_value: 20000.0, weight_divisor: 5.0 },
    ItemSpec { id: "traveler's_fruit", display_name: "Traveler's Fruit", base_value: 20000.0, weight_divisor: 2.0 },
    ItemSpec { id: "ice_cream_bean", display_name: "Ice Cream Bean", base_value: 4500.0, weight_divisor: 4.0 },
    ItemSpec { id: "lime", display_name: "Lime", base_value: 1000.0, weight_divisor: 1.0 },
];

#[rustfmt::skip]
pub const MUTATIONS: &[Multiplier] = &[
    Multiplier { id: "windstruck", display_name: "Windstruck", factor: 5.0 },
    Multiplier { id: "twisted", display_name: "Twisted", factor: 5.0 },
    Multiplier { id: "voidtouched", display_name: "Voidtouched", factor: 135.0 },
    Multiplier { id: "moonlit", display_name: "Moonlit", factor: 2.0 },
    Multiplier { id: "pollinated", display_name: "Pollinated", factor: 3.0 },
    Multiplier { id: "honeyglazed", display_name: "HoneyGlazed", factor: 5.0 },
    Multiplier { id: "plasma", display_name: "Plasma", factor: 5.0 },
    Multiplier { id: "molten", display_name: "Molten", factor: 25.0 },
    Multiplier { id: "frozen", display_name: "Frozen", factor: 10.0 },
    Multiplier { id: "celestial", display_name: "Celestial", factor: 120.0 },
    Multiplier { id: "burnt", display_name: "Burnt", factor: 4.0 },
    Multiplier { id: "dawnbound", display_name: "Dawnbound", factor: 150.0 },
    Multiplier { id: "shocked", display_name: "Shocked", factor: 100.0 },
    Multiplier { id: "bloodlit", display_name: "Bloodlit", factor: 4.0 },
    Multiplier { id: "chilled", display_name: "Chilled", factor: 2.0 },
    Multiplier { id: "choc", display_name: "Choc", factor: 2.0 },
    Multiplier { id: "zombified", display_name: "Zombified", factor: 25.0 },
    Multiplier { id: "heavenly", display_name: "Heavenly", factor: 5.0 },
    Multiplier { id: "cooked", display_name: "Cooked", factor: 10.0 },
    Multiplier { id: "disco", display_name: "Disco", factor: 125.0 },
    Multiplier { id: "wet", display_name: "Wet", factor: 3.0 },
    Multiplier { id: "sweet", display_name: "Sweet", factor: 2.0 },
    Multiplier { id: "swampy", display_name: "Swampy", factor: 1.0 },
    Multiplier { id: "ghostly", display_name: "Ghostly", factor: 90.0 },
    Multiplier { id: "meteoric", display_name: "Meteoric", factor: 125.0 },
];

#[rustfmt::skip]
pub const VARIANTS: &[Multiplier] = &[
    Multiplier { id: "normal", display_name: "Normal", factor: 1.0 },
    Multiplier { id: "gold", display_name: "Gold", factor: 20.0 },
    Multiplier { id: "rainbow", display_name: "Rainbow", factor: 50.0 },
];
