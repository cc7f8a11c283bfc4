//! Hand-authored content in both languages.
//!
//! Used wholesale when no site checkout is available, and section by section
//! when a component file yields nothing. Competencies, education,
//! certificates and spoken languages only exist here. The two language
//! blocks are literal fixtures; the English text is not derived from the
//! Swedish one.

use super::{
    BilingualContent, Contact, ContentOrigin, CvContent, Education, Experience, Language, Project,
    SkillCategory,
};

/// Profile title used when the site does not provide one.
pub const DEFAULT_PROFILE_TITLE: &str = "DATACENTER MANAGER • OPERATIONS ENGINEER";

/// The contact block.
pub fn contact() -> Contact {
    Contact {
        name: "Daniel Hansson".into(),
        email: "mailto@danielhansson.nu".into(),
        phone: "+46 734 04 55 55".into(),
        phone_dial: "+46734045555".into(),
        linkedin: "linkedin.com/in/daniel-hansson-7564a490".into(),
        github: "github.com/enoch85".into(),
        website: "rekrytera.danielhansson.nu".into(),
        location: "Genarp, Skåne, Sweden".into(),
    }
}

/// Both languages, fixtures only.
pub fn bilingual() -> BilingualContent {
    BilingualContent {
        origin: ContentOrigin::Fallback,
        swedish: content(Language::Swedish),
        english: content(Language::English),
    }
}

/// All fixture content of one language.
pub fn content(language: Language) -> CvContent {
    CvContent {
        profile_title: DEFAULT_PROFILE_TITLE.to_string(),
        profile_text: profile_text(language).to_string(),
        competencies: competencies(language),
        experiences: experiences(language),
        education: education(language),
        certificates: certificates(language),
        skills: skills(language),
        projects: projects(language),
        languages: spoken_languages(language),
    }
}

pub fn profile_text(language: Language) -> &'static str {
    match language {
        Language::Swedish => concat!(
            "Med passion för automation, stabilitet och kontinuerlig förbättring. ",
            "Kombinerar teknisk expertis inom Linux, virtualisering och infrastruktur med beprövad ",
            "förmåga att leda team och driva moderniserings- och migreringsprojekt. ",
            "Entreprenöriell bakgrund med affärsförståelse och lösningsorienterat mindset."
        ),
        Language::English => concat!(
            "With a passion for automation, stability, and continuous improvement. Combines ",
            "technical expertise in Linux, virtualization, and infrastructure with proven ",
            "ability to lead teams and drive modernization and migration projects. ",
            "Entrepreneurial background with business understanding and solution-oriented mindset."
        ),
    }
}

pub fn competencies(language: Language) -> Vec<String> {
    let items: &[&str] = match language {
        Language::Swedish => &[
            "Datacenterdrift & Management",
            "Server- & Infrastrukturadministration",
            "Virtualisering & Hypervisors (VMware, Nutanix, Proxmox, Hyper-V)",
            "Open Source & Automation",
            "Entreprenörskap & Affärsutveckling",
        ],
        Language::English => &[
            "Datacenter Operations & Management",
            "Server & Infrastructure Administration",
            "Virtualization & Hypervisors (VMware, Nutanix, Proxmox, Hyper-V)",
            "Open Source & Automation",
            "Entrepreneurship & Business Development",
        ],
    };
    owned(items)
}

pub fn skills(language: Language) -> Vec<SkillCategory> {
    let titles: [&str; 5] = match language {
        Language::Swedish => [
            "Virtualisering & Hypervisors",
            "OS & Servrar",
            "Backup & Lagring",
            "Nätverk & Säkerhet",
            "Automation",
        ],
        Language::English => [
            "Virtualization & Hypervisors",
            "OS & Servers",
            "Backup & Storage",
            "Network & Security",
            "Automation",
        ],
    };
    let skills = [
        "VMware vSphere/ESX, Nutanix AHV, Hyper-V, Proxmox VE, HCI",
        "Linux (Ubuntu/Debian/Alpine), Windows Server, AD, Exchange, Azure, Docker",
        "Veeam, Ahsay, Proxmox PBS, Disaster Recovery, HA",
        "VPN, DNS/BIND, Fortigate, opnSense, pfSense, Unifi",
        "Ansible, Bash, PowerShell, VS Code, IaC, Packer, Git",
    ];
    titles
        .iter()
        .zip(skills)
        .map(|(title, skills)| SkillCategory {
            title: title.to_string(),
            skills: skills.to_string(),
        })
        .collect()
}

pub fn experiences(language: Language) -> Vec<Experience> {
    match language {
        Language::Swedish => vec![
            job(
                "Datacenter Manager",
                "InfraCom Smart Digital Solutions",
                "Malmö",
                "Nov 2023 – Nuvarande",
                concat!(
                    "Ansvarar för ett team i södra Sverige som jobbar med drift och utveckling av datacenter nationellt. ",
                    "Säkerställer hög tillgänglighet för kritisk infrastruktur genom proaktiv monitoring, incident management och kontinuerliga förbättringar. ",
                    "Driver moderniseringsprojekt inkl. migrering mellan hypervisors, och automation av rutinuppgifter. ",
                    "Jobbar under ISO 27001 enligt ITIL-ramverk."
                ),
                "Datacenter Operations, VMware vSphere, Nutanix, Proxmox, Team Leadership, Incident Management",
                false,
            ),
            job(
                "Applikationsspecialist",
                "Redpill Linpro",
                "Linköping (Remote)",
                "Feb 2023 – Nov 2023",
                concat!(
                    "Implementerade och supporterade enterprise open source-lösningar för svenska myndigheter. ",
                    "Fokus på säkra, skalbara plattformar baserade på öppna standarder med krav på hög tillgänglighet och compliance."
                ),
                "Nextcloud Enterprise, Jitsi, Linux, Customer Support",
                true,
            ),
            job(
                "Founder & CTO",
                "T&M Hansson IT AB",
                "Genarp",
                "Sep 2018 – Nov 2023",
                concat!(
                    "Grundade och drev IT-konsultbolag specialiserat på open source-infrastruktur och automation. ",
                    "Maintainer för Nextclouds officiella VM (100+ nedladdningar/dag globalt). ",
                    "Utvecklade automatiserade deployment-lösningar för flera virtualiseringsplattformar. ",
                    "Supporterade kunder över hela världen. Sålde bolaget till Kafit AB 2021."
                ),
                "Entrepreneurship, IaC, Bash Automation, Open Source Maintenance",
                false,
            ),
            job(
                "Operations / DevOps Engineer",
                "SenseNode",
                "Lund",
                "Feb 2022 – Feb 2023",
                concat!(
                    "Tillverkade och installerade IoT-enheter med Ansible för energimätning hos stora industrier. ",
                    "Ansvarade för att organisera RAM-avtal med telefonioperatörer och säkerställa enheter alltid var uppkopplade. ",
                    "Gav support och förvaltade infrastruktur för säker dataöverföring."
                ),
                "IoT, Operations, Customer Support, Vendor Management",
                false,
            ),
            job(
                "IT-tekniker → Systemadministratör",
                "Vessinge IT",
                "Malmö",
                "Jul 2017 – Jan 2022",
                concat!(
                    "Började som IT-tekniker och avancerade till systemadministratör med huvudansvar för alla servrar och mjukvaror. ",
                    "Blev senare ansvarig för Second-Line support. ",
                    "Förvaltade Windows/Linux hybrid-miljö med VMware, Hyper-V, Windows Server 2008-2019, Ubuntu, Docker och Portainer. ",
                    "Daglig kontakt med leverantörer och åtgärdade problem på högre teknisk nivå."
                ),
                "System Admin, VMware/Hyper-V, Windows/Linux Hybrid, SQL Server",
                false,
            ),
            job(
                "Account Manager",
                "Örestad Linux AB",
                "Malmö",
                "Nov 2016 – Maj 2017",
                concat!(
                    "Teknisk säljroll med fokus på Linux-baserade hosting-lösningar. ",
                    "Gjorde Örestad Linux till Nextcloud partner och implementerade VPS-plattform för Nextcloud-hosting."
                ),
                "Technical Pre-Sales, Linux Solutions, Nextcloud",
                true,
            ),
            job(
                "Tidigare entreprenörskarriär och försäljning",
                "",
                "Västerås, Malmö",
                "2008 – 2016",
                concat!(
                    "HSN Konsult (2008-2011): Grundare, B2B-försäljning. Sålde företaget 2011.\n",
                    "Powersales Sweden AB (2011-2014): CTO. Ansvarade för IT.\n",
                    "Trygg-Hansa (2014-2016): Försäkringsrådgivare."
                ),
                "Business Development, CTO, B2B Sales",
                false,
            ),
        ],
        Language::English => vec![
            job(
                "Datacenter Manager",
                "InfraCom Smart Digital Solutions",
                "Malmö",
                "Nov 2023 – Present",
                concat!(
                    "Responsible for a team in southern Sweden working with operations and development of datacenters nationally. ",
                    "Ensures high availability for critical infrastructure through proactive monitoring, incident management, and continuous improvements. ",
                    "Drives modernization projects including migration between hypervisors, and automation of routine tasks. ",
                    "Working under ISO 27001 according to ITIL framework."
                ),
                "Datacenter Operations, VMware vSphere, Nutanix, Proxmox, Team Leadership, Incident Management",
                false,
            ),
            job(
                "Application Specialist",
                "Redpill Linpro",
                "Linköping (Remote)",
                "Feb 2023 – Nov 2023",
                concat!(
                    "Implemented and supported enterprise open source solutions for Swedish government agencies. ",
                    "Focus on secure, scalable platforms based on open standards with requirements for high availability and compliance."
                ),
                "Nextcloud Enterprise, Jitsi, Linux, Customer Support",
                true,
            ),
            job(
                "Founder & CTO",
                "T&M Hansson IT AB",
                "Genarp",
                "Sep 2018 – Nov 2023",
                concat!(
                    "Founded and ran an IT consulting company specialized in open source infrastructure and automation. ",
                    "Maintainer for Nextcloud's official VM (100+ downloads/day globally). ",
                    "Developed automated deployment solutions for several virtualization platforms. ",
                    "Supported customers worldwide. Sold the company to Kafit AB 2021."
                ),
                "Entrepreneurship, IaC, Bash Automation, Open Source Maintenance",
                false,
            ),
            job(
                "Operations / DevOps Engineer",
                "SenseNode",
                "Lund",
                "Feb 2022 – Feb 2023",
                concat!(
                    "Manufactured and installed IoT devices with Ansible for energy metering at large industries. ",
                    "Responsible for organizing framework agreements with telephony operators and ensuring devices were always connected. ",
                    "Provided support and managed infrastructure for secure data transfer."
                ),
                "IoT, Operations, Customer Support, Vendor Management",
                false,
            ),
            job(
                "IT Technician → System Administrator",
                "Vessinge IT",
                "Malmö",
                "Jul 2017 – Jan 2022",
                concat!(
                    "Started as IT technician and advanced to system administrator with main responsibility for all servers and software. ",
                    "Later became responsible for Second-Line support. ",
                    "Managed Windows/Linux hybrid environment with VMware, Hyper-V, Windows Server 2008-2019, Ubuntu, Docker, and Portainer. ",
                    "Daily contact with vendors and resolved issues at a higher technical level."
                ),
                "System Admin, VMware/Hyper-V, Windows/Linux Hybrid, SQL Server",
                false,
            ),
            job(
                "Account Manager",
                "Örestad Linux AB",
                "Malmö",
                "Nov 2016 – May 2017",
                concat!(
                    "Technical sales role focusing on Linux-based hosting solutions. ",
                    "Made Örestad Linux a Nextcloud partner and implemented VPS platform for Nextcloud hosting."
                ),
                "Technical Pre-Sales, Linux Solutions, Nextcloud",
                true,
            ),
            job(
                "Previous Sales Career",
                "",
                "Västerås, Malmö",
                "2008 – 2016",
                concat!(
                    "HSN Konsult (2008-2011): Founder, B2B sales. Sold company in 2011.\n",
                    "Powersales Sweden AB (2011-2014): CTO. Responsible for IT.\n",
                    "Trygg-Hansa (2014-2016): Insurance Advisor."
                ),
                "Business Development, CTO, B2B Sales",
                false,
            ),
        ],
    }
}

pub fn education(language: Language) -> Vec<Education> {
    let (yh, diploma) = match language {
        Language::Swedish => ("IT & Sales (300 YH-poäng)", "Gymnasieexamen"),
        Language::English => ("IT & Sales (300 YH-points)", "High School Diploma"),
    };
    vec![
        Education {
            degree: yh.into(),
            school: "EC Utbildning, Malmö".into(),
            date: "2013 – 2014".into(),
        },
        Education {
            degree: diploma.into(),
            school: "Västerås".into(),
            date: String::new(),
        },
    ]
}

pub fn certificates(language: Language) -> Vec<String> {
    let items: &[&str] = match language {
        Language::Swedish => &[
            "Nutanix ECA (2024)",
            "Certifierad Försäkringsförmedlare (2014)",
            "Microsoft Technical Advisor (2016)",
        ],
        Language::English => &[
            "Nutanix ECA (2024)",
            "Certified Insurance Intermediary (2014)",
            "Microsoft Technical Advisor (2016)",
        ],
    };
    owned(items)
}

pub fn projects(language: Language) -> Vec<Project> {
    let descriptions: [&str; 4] = match language {
        Language::Swedish => [
            "Officiell Nextcloud-appliance med interaktiva skript för säker hosting. Används globalt.",
            "MQTT-integration för Open Vehicle Monitoring System.",
            "Global elprisprognos-integration.",
            "Intelligent värmepumpsoptimering med ML.",
        ],
        Language::English => [
            "Official Nextcloud appliance with interactive scripts for secure hosting. Used globally.",
            "MQTT integration for Open Vehicle Monitoring System.",
            "Global electricity price forecast integration.",
            "Intelligent heat pump optimization using ML.",
        ],
    };
    let names = [
        "Nextcloud VM",
        "OVMS Home Assistant",
        "Global Energy Spotprices",
        "EffektGuard",
    ];
    names
        .iter()
        .zip(descriptions)
        .map(|(name, description)| Project {
            name: name.to_string(),
            description: description.to_string(),
        })
        .collect()
}

pub fn spoken_languages(language: Language) -> Vec<String> {
    let items: &[&str] = match language {
        Language::Swedish => &[
            "Svenska (Modersmål)",
            "Engelska (Flytande)",
            "Portugisiska (Nybörjare)",
        ],
        Language::English => &[
            "Swedish (Native)",
            "English (Fluent)",
            "Portuguese (Beginner)",
        ],
    };
    owned(items)
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn job(
    title: &str,
    company: &str,
    location: &str,
    date: &str,
    description: &str,
    keywords: &str,
    page_break_before: bool,
) -> Experience {
    Experience {
        title: title.into(),
        company: company.into(),
        location: location.into(),
        date: date.into(),
        description: description.into(),
        keywords: keywords.into(),
        page_break_before,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_job_title_is_shared() {
        let content = bilingual();
        assert_eq!(content.swedish.experiences[0].title, "Datacenter Manager");
        assert_eq!(content.english.experiences[0].title, "Datacenter Manager");
    }

    #[test]
    fn fixtures_are_aligned() {
        let content = bilingual();
        assert!(content.is_aligned());
        assert_eq!(content.english.experiences.len(), 7);
        assert_eq!(content.english.skills.len(), 5);
        assert_eq!(content.english.projects.len(), 4);
    }

    #[test]
    fn page_breaks_match_layout() {
        let breaks: Vec<bool> = experiences(Language::English)
            .iter()
            .map(|e| e.page_break_before)
            .collect();
        assert_eq!(breaks, vec![false, true, false, false, false, true, false]);
    }

    #[test]
    fn dates_are_localised_in_fixtures() {
        assert_eq!(
            experiences(Language::Swedish)[0].date,
            "Nov 2023 – Nuvarande"
        );
        assert_eq!(experiences(Language::English)[0].date, "Nov 2023 – Present");
    }
}
