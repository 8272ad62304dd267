//! Sample catalog used to populate a fresh deployment

use crate::models::NewProduct;

/// name, brand, category, description, price, rating, in stock
type SampleRow = (&'static str, &'static str, &'static str, &'static str, f64, f64, bool);

const SAMPLE_ROWS: [SampleRow; 20] = [
    ("Runner Pro Shoes", "Nike", "Shoes", "Lightweight running shoes with breathable mesh upper", 129.99, 4.6, true),
    ("Street Flex Sneakers", "Adidas", "Shoes", "Daily wear sneakers designed for city comfort", 99.99, 4.2, true),
    ("Trail Climber Boots", "Columbia", "Shoes", "Water-resistant boots made for mountain trails", 179.0, 4.4, true),
    ("Urban Denim Jacket", "Levis", "Clothing", "Classic denim jacket with modern fit", 89.5, 4.1, true),
    ("WindShield Running Jacket", "Puma", "Clothing", "Windproof jacket for joggers and cyclists", 149.0, 4.5, false),
    ("Cotton Comfort T-Shirt", "Uniqlo", "Clothing", "Soft cotton t-shirt for everyday wear", 19.99, 4.0, true),
    ("Noise Cancel Pro Headphones", "Sony", "Electronics", "Over-ear noise canceling headphones with rich bass", 349.99, 4.8, true),
    ("SoundBeat Earbuds", "JBL", "Electronics", "Wireless earbuds with long battery life", 79.0, 4.3, true),
    ("SmartFit Fitness Band", "Xiaomi", "Electronics", "Fitness tracker with heart rate and sleep monitoring", 59.99, 4.1, true),
    ("HomeBrew Coffee Maker", "Philips", "Home Appliances", "Automatic coffee machine with reusable filter", 249.0, 4.5, false),
    ("Kitchen Plus Blender", "Hamilton", "Home Appliances", "High-speed blender for smoothies and soups", 119.49, 4.2, true),
    ("AirCool Table Fan", "Honeywell", "Home Appliances", "Compact oscillating fan with silent mode", 49.95, 3.9, true),
    ("Pixel View Smartphone", "Google", "Mobiles", "Android smartphone with AI camera tools", 799.0, 4.7, true),
    ("Galaxy Vision Phone", "Samsung", "Mobiles", "High refresh display and pro camera system", 999.99, 4.6, true),
    ("Budget Lite Phone", "Motorola", "Mobiles", "Affordable smartphone with all-day battery", 219.99, 4.0, true),
    ("ProType Mechanical Keyboard", "Logitech", "Computers", "Mechanical keyboard with tactile switches", 139.99, 4.5, true),
    ("UltraWide 27 Monitor", "Dell", "Computers", "27 inch monitor with vivid colors and USB-C", 329.0, 4.4, false),
    ("SwiftBook Laptop 14", "Acer", "Computers", "Portable laptop for students and office work", 649.0, 4.2, true),
    ("Active Yoga Mat", "Reebok", "Sports", "Non-slip yoga mat with medium cushioning", 39.99, 4.3, true),
    ("PowerGrip Dumbbell Set", "Decathlon", "Sports", "Adjustable dumbbell kit for home workouts", 189.0, 4.6, true),
];

/// Twenty products across shoes, clothing, electronics, appliances, phones,
/// computers and sports gear
pub fn sample_products() -> Vec<NewProduct> {
    SAMPLE_ROWS
        .iter()
        .map(|&(name, brand, category, description, price, rating, in_stock)| NewProduct {
            name: name.to_string(),
            brand: brand.to_string(),
            category: category.to_string(),
            description: Some(description.to_string()),
            price,
            rating: Some(rating),
            in_stock: Some(in_stock),
        })
        .collect()
}
