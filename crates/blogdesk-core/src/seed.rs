//! Sample posts loaded on first run

use chrono::{NaiveDate, NaiveTime};

use crate::models::{Category, Post, PostId, PostImage, PostStatus};

struct SeedPost {
    title: &'static str,
    description: &'static str,
    category: Category,
    author: &'static str,
    image: Option<&'static str>,
    publish_date: (i32, u32, u32),
    status: PostStatus,
}

const SEED: &[SeedPost] = &[
    SeedPost {
        title: "React 19.2: Partial Pre-rendering and Performance Boosts",
        description: "Dive into the new Partial Pre-rendering feature in React 19.2, along with batched Suspense reveals and other optimizations that make your apps faster and more efficient.",
        category: Category::Technology,
        author: "Jordan Lee",
        image: Some("https://graphqleditorcms.fra1.cdn.digitaloceanspaces.com/graphqleditorcms/blogpost/react19-1730851347059.webp"),
        publish_date: (2025, 12, 1),
        status: PostStatus::Published,
    },
    SeedPost {
        title: "AI-Powered Web Development: Tools Transforming 2025",
        description: "Explore how AI tools are automating code generation, testing, and personalization, revolutionizing workflows for developers in 2025.",
        category: Category::Technology,
        author: "Mia Thompson",
        image: Some("https://www.pranathiss.com/blog/wp-content/uploads/Future-of-Web-Development-AI-Chatbots-and-Voice-User-Interfaces.jpg"),
        publish_date: (2025, 12, 5),
        status: PostStatus::Published,
    },
    SeedPost {
        title: "Web Performance Optimization Techniques for 2025",
        description: "Learn essential strategies to optimize web performance, including image optimization, code splitting, and modern tools for faster load times.",
        category: Category::Technology,
        author: "Sophia Patel",
        image: Some("https://www.xenonstack.com/hubfs/web-performance-optimization.png"),
        publish_date: (2025, 12, 12),
        status: PostStatus::Draft,
    },
    SeedPost {
        title: "Tailwind CSS v4: Faster Builds and Modern Features",
        description: "Uncover the high-performance engine, CSS-first configuration, and new utilities in Tailwind CSS v4 that streamline your design workflow.",
        category: Category::Design,
        author: "Olivia Grant",
        image: Some("https://s3-alpha.figma.com/hub/file/2233198195466281252/1e595b88-a03f-402b-8a22-86cf71692ce1-cover.png"),
        publish_date: (2025, 12, 2),
        status: PostStatus::Published,
    },
    SeedPost {
        title: "Sustainable Web Design Trends for 2025",
        description: "How eco-friendly hosting, efficient code, and optimized media are shaping greener, faster websites in the new year.",
        category: Category::Design,
        author: "Ava Ramirez",
        image: Some("https://copyblogger.com/cdn-origin/images/modern-portfolio-devices.png"),
        publish_date: (2025, 12, 9),
        status: PostStatus::Draft,
    },
    SeedPost {
        title: "Building Inclusive Web Apps: Accessibility in 2025",
        description: "Essential techniques for WCAG compliance, semantic HTML, keyboard navigation, and ARIA roles to create accessible experiences.",
        category: Category::Development,
        author: "Mason Ellis",
        image: None,
        publish_date: (2025, 12, 3),
        status: PostStatus::Published,
    },
    SeedPost {
        title: "Serverless Architectures: Scaling Apps Effortlessly",
        description: "Advantages of serverless computing for modern web apps, including cost efficiency and auto-scaling.",
        category: Category::Development,
        author: "Harper Sullivan",
        image: None,
        publish_date: (2025, 12, 7),
        status: PostStatus::Draft,
    },
    SeedPost {
        title: "Top Business Growth Trends to Watch in 2025",
        description: "Key strategies and emerging trends driving sustainable business expansion in the coming year.",
        category: Category::Business,
        author: "Nathan Cole",
        image: Some("https://imageio.forbes.com/specials-images/imageserve/6790b2696756ad66f164f351/0x0.jpg?format=jpg&height=600&width=1200&fit=bounds"),
        publish_date: (2025, 12, 4),
        status: PostStatus::Published,
    },
    SeedPost {
        title: "Wellness Trends Shaping 2025: Mind and Body Balance",
        description: "From mindfulness practices to personalized fitness, discover habits for a healthier lifestyle.",
        category: Category::Lifestyle,
        author: "Evelyn Shaw",
        image: Some("https://www.hotbot.com/articles/wp-content/uploads/2025/06/top-10-womens-lifestyle-trends-in-2025-health-wellness-success-LC-1024x683.jpeg"),
        publish_date: (2025, 12, 5),
        status: PostStatus::Published,
    },
    SeedPost {
        title: "Sustainable Living: Eco-Friendly Habits at Home",
        description: "Simple changes for reducing waste, energy use, and building a greener daily routine.",
        category: Category::Lifestyle,
        author: "Julian Pierce",
        image: Some("https://content.ctpublic.org/wp-content/uploads/2025/06/3062948-e1750944874353-1824x1024.jpg"),
        publish_date: (2025, 12, 9),
        status: PostStatus::Published,
    },
];

/// The sample posts, with ids "1" to "N"
///
/// Each post was created and last updated at midnight UTC on its publish date.
pub fn seed_posts() -> Vec<Post> {
    SEED.iter()
        .enumerate()
        .map(|(index, seed)| {
            let (year, month, day) = seed.publish_date;
            let publish_date = NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default();
            let stamp = publish_date.and_time(NaiveTime::MIN).and_utc();

            Post {
                id: PostId::new((index + 1).to_string()),
                title: seed.title.to_string(),
                description: seed.description.to_string(),
                category: seed.category,
                author: seed.author.to_string(),
                image: seed.image.map(|url| PostImage::Url {
                    url: url.to_string(),
                }),
                publish_date,
                status: seed.status,
                created_at: stamp,
                updated_at: stamp,
            }
        })
        .collect()
}
